//! Prescription service: queries, validation and the submission gateway.
//!
//! Stateless operations over the reference tables plus the HIS client.
//! Every collaborator is injected at construction; there is no process-wide
//! client handle. The submission gateway is the single place where a
//! validation failure becomes a final denial, which keeps the invariant
//! that nothing unsafe reaches the HIS.

use crate::formulary::{Formulary, FormularyItem};
use crate::his::{HisClient, HisPatient};
use crate::order::OrderDraft;
use crate::renal::RenalDosing;
use crate::results::{OrderResult, RenalAdjustment, StopResult, ValidationResult};
use crate::validator::OrderValidator;
use std::sync::Arc;

/// Atomic prescription operations for the tool surface.
///
/// Each method is a pure function of its inputs and the injected
/// collaborators; any session state lives in the caller's workflow.
pub struct PrescriptionService {
    formulary: Arc<Formulary>,
    renal_dosing: Arc<RenalDosing>,
    his: Arc<dyn HisClient>,
    validator: OrderValidator,
}

impl PrescriptionService {
    pub fn new(
        formulary: Arc<Formulary>,
        renal_dosing: Arc<RenalDosing>,
        his: Arc<dyn HisClient>,
    ) -> Self {
        let validator = OrderValidator::new(formulary.clone(), renal_dosing.clone());
        Self {
            formulary,
            renal_dosing,
            his,
            validator,
        }
    }

    // Query operations -----------------------------------------------------

    pub fn formulary_item(&self, drug_code: &str) -> Option<FormularyItem> {
        self.formulary.get(drug_code).cloned()
    }

    pub fn search_formulary(&self, query: &str, limit: usize) -> Vec<FormularyItem> {
        self.formulary
            .search(query, limit)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn renal_adjustment(&self, drug_code: &str, crcl: f64) -> RenalAdjustment {
        self.renal_dosing.adjustment_for(drug_code, crcl)
    }

    /// Whether the drug is flagged high-alert; unknown codes are not.
    pub fn is_high_alert(&self, drug_code: &str) -> bool {
        self.formulary
            .get(drug_code)
            .map(|item| item.high_alert)
            .unwrap_or(false)
    }

    pub fn high_alert_drugs(&self) -> Vec<FormularyItem> {
        self.formulary
            .high_alert_items()
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn renal_adjustment_drugs(&self) -> Vec<FormularyItem> {
        self.formulary
            .renal_adjustment_items()
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn patient(&self, patient_id: &str) -> Option<HisPatient> {
        self.his.get_patient(patient_id).await
    }

    // Check operations -----------------------------------------------------

    /// Validate a proposed order. See [`OrderValidator::validate`].
    pub fn validate_order(
        &self,
        drug_code: &str,
        dose: f64,
        dose_unit: &str,
        route: &str,
        frequency: &str,
        patient_crcl: Option<f64>,
    ) -> ValidationResult {
        self.validator
            .validate(drug_code, dose, dose_unit, route, frequency, patient_crcl)
    }

    // Action operations ----------------------------------------------------

    /// Validate and, if safe, forward an order to the HIS.
    ///
    /// `patient_crcl` is the clearance the caller already computed (if
    /// any); re-validation runs with exactly that value. A failing
    /// validation or unacknowledged warnings deny the submission without
    /// any HIS call; acknowledgment happens by re-invoking with
    /// `override_warnings = true`, which keeps it an explicit, auditable
    /// second step. HIS failures are passed through without retry.
    pub async fn submit_order(
        &self,
        draft: &OrderDraft,
        patient_crcl: Option<f64>,
        override_warnings: bool,
    ) -> OrderResult {
        let validation = self.validate_order(
            &draft.drug_code,
            draft.dose,
            &draft.dose_unit,
            &draft.route,
            &draft.frequency,
            patient_crcl,
        );

        if !validation.valid {
            return OrderResult::fail(
                validation.errors,
                "validation failed, order not submitted".to_string(),
            );
        }

        if validation.has_warnings() && !override_warnings {
            return OrderResult::fail(
                vec![format!(
                    "warnings require confirmation: {}",
                    validation.warnings.join("; ")
                )],
                "set override_warnings to acknowledge the warnings".to_string(),
            );
        }

        let response = self.his.create_order(draft).await;
        if response.success {
            OrderResult::ok(response.order_id.unwrap_or_default(), response.message)
        } else {
            OrderResult::fail(vec![response.message], "HIS rejected the order".to_string())
        }
    }

    /// Discontinue an existing order through the HIS.
    pub async fn stop_order(&self, order_id: &str, reason: &str) -> StopResult {
        let response = self.his.discontinue_order(order_id, reason).await;
        if response.success {
            StopResult::ok(response.message)
        } else {
            StopResult::fail(response.message)
        }
    }
}
