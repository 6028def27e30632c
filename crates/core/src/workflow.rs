//! Example prescription workflow: a linear pipeline with one conditional
//! branch.
//!
//! Estimate renal function from the HIS patient record, validate every
//! draft order, then either stop (errors), wait for the prescriber to
//! confirm (warnings), or check interactions and submit. State lives in
//! the request and outcome values; the services themselves stay stateless.

use crate::crcl::estimate_crcl;
use crate::interactions::{InteractionIndex, InteractionSeverity};
use crate::order::OrderDraft;
use crate::prescription::PrescriptionService;
use std::sync::Arc;

/// One medication requested in a prescription run.
#[derive(Debug, Clone, PartialEq)]
pub struct MedicationRequest {
    pub drug_code: String,
    pub dose: f64,
    pub dose_unit: String,
    pub route: String,
    pub frequency: String,
    pub duration_days: u32,
    pub notes: Option<String>,
}

/// A full prescription run for one patient.
#[derive(Debug, Clone, PartialEq)]
pub struct PrescriptionRequest {
    pub patient_id: String,
    pub physician_id: String,
    /// Whether the prescriber has already acknowledged warnings.
    pub confirmed: bool,
    pub medications: Vec<MedicationRequest>,
}

/// Terminal state of a prescription run.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowOutcome {
    /// Blocking findings; nothing was submitted.
    Rejected { errors: Vec<String> },
    /// Advisory findings; re-run with `confirmed = true` to proceed.
    NeedsConfirmation { warnings: Vec<String> },
    /// Orders were forwarded to the HIS.
    Submitted {
        patient_crcl: Option<f64>,
        order_ids: Vec<String>,
        warnings: Vec<String>,
        failures: Vec<String>,
    },
}

/// Drives the validate-confirm-submit pipeline over the prescription
/// service and the interaction index.
pub struct PrescriptionWorkflow {
    service: Arc<PrescriptionService>,
    interactions: Arc<InteractionIndex>,
}

impl PrescriptionWorkflow {
    pub fn new(service: Arc<PrescriptionService>, interactions: Arc<InteractionIndex>) -> Self {
        Self {
            service,
            interactions,
        }
    }

    /// Run the pipeline to a terminal outcome.
    pub async fn run(&self, request: &PrescriptionRequest) -> WorkflowOutcome {
        // Renal function first: validation needs the CrCl.
        let patient = self.service.patient(&request.patient_id).await;
        let Some(patient) = patient else {
            return WorkflowOutcome::Rejected {
                errors: vec![format!("patient {} not found", request.patient_id)],
            };
        };

        let patient_crcl = match estimate_crcl(
            patient.age_years,
            patient.weight_kg,
            patient.serum_creatinine,
            patient.sex,
        ) {
            Ok(estimate) => Some(estimate.value),
            Err(error) => {
                tracing::warn!(
                    patient_id = %request.patient_id,
                    %error,
                    "could not estimate CrCl, validating without renal data"
                );
                None
            }
        };

        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        for medication in &request.medications {
            let validation = self.service.validate_order(
                &medication.drug_code,
                medication.dose,
                &medication.dose_unit,
                &medication.route,
                &medication.frequency,
                patient_crcl,
            );
            errors.extend(validation.errors);
            warnings.extend(validation.warnings);
        }

        if !errors.is_empty() {
            return WorkflowOutcome::Rejected { errors };
        }
        if !warnings.is_empty() && !request.confirmed {
            return WorkflowOutcome::NeedsConfirmation { warnings };
        }

        // Interactions across the whole medication list, by generic name.
        let generic_names: Vec<String> = request
            .medications
            .iter()
            .filter_map(|m| self.service.formulary_item(&m.drug_code))
            .map(|item| item.generic_name)
            .collect();
        for interaction in self.interactions.check_list(&generic_names) {
            let finding = format!(
                "{} + {}: {}",
                interaction.drug_a, interaction.drug_b, interaction.recommendation
            );
            if interaction.severity == InteractionSeverity::Contraindicated {
                errors.push(finding);
            } else {
                warnings.push(finding);
            }
        }
        if !errors.is_empty() {
            return WorkflowOutcome::Rejected { errors };
        }

        // Warnings are acknowledged by this point, so submissions override.
        let mut order_ids = Vec::new();
        let mut failures = Vec::new();
        for medication in &request.medications {
            let draft = OrderDraft {
                patient_id: request.patient_id.clone(),
                drug_code: medication.drug_code.clone(),
                dose: medication.dose,
                dose_unit: medication.dose_unit.clone(),
                route: medication.route.clone(),
                frequency: medication.frequency.clone(),
                duration_days: medication.duration_days,
                physician_id: request.physician_id.clone(),
                notes: medication.notes.clone(),
            };
            let result = self.service.submit_order(&draft, patient_crcl, true).await;
            if result.success {
                order_ids.extend(result.order_id);
            } else {
                failures.extend(result.errors);
            }
        }

        WorkflowOutcome::Submitted {
            patient_crcl,
            order_ids,
            warnings,
            failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interactions::InteractionRecord;
    use crate::prescription::tests::service;

    fn medication(drug_code: &str, dose: f64, route: &str, frequency: &str) -> MedicationRequest {
        MedicationRequest {
            drug_code: drug_code.into(),
            dose,
            dose_unit: "mg".into(),
            route: route.into(),
            frequency: frequency.into(),
            duration_days: 7,
            notes: None,
        }
    }

    fn workflow(records: Vec<InteractionRecord>) -> PrescriptionWorkflow {
        PrescriptionWorkflow::new(
            Arc::new(service()),
            Arc::new(InteractionIndex::from_records(records)),
        )
    }

    fn request(confirmed: bool, medications: Vec<MedicationRequest>) -> PrescriptionRequest {
        PrescriptionRequest {
            patient_id: "P002".into(),
            physician_id: "DR001".into(),
            confirmed,
            medications,
        }
    }

    #[tokio::test]
    async fn test_clean_run_submits() {
        let workflow = workflow(Vec::new());
        // Amoxicillin for the healthy patient: no warnings at all.
        let outcome = workflow
            .run(&request(false, vec![medication("AMOXI-CAP", 500.0, "PO", "TID")]))
            .await;

        match outcome {
            WorkflowOutcome::Submitted {
                patient_crcl,
                order_ids,
                failures,
                ..
            } => {
                assert!(patient_crcl.is_some());
                assert_eq!(order_ids.len(), 1);
                assert!(failures.is_empty());
            }
            other => panic!("expected Submitted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_patient_rejects() {
        let workflow = workflow(Vec::new());
        let mut req = request(false, vec![medication("AMOXI-CAP", 500.0, "PO", "TID")]);
        req.patient_id = "P999".into();

        let outcome = workflow.run(&req).await;
        match outcome {
            WorkflowOutcome::Rejected { errors } => {
                assert!(errors[0].contains("P999"));
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_validation_error_rejects() {
        let workflow = workflow(Vec::new());
        let outcome = workflow
            .run(&request(true, vec![medication("GENTA-INJ", 80.0, "PO", "Q8H")]))
            .await;

        match outcome {
            WorkflowOutcome::Rejected { errors } => {
                assert!(errors.iter().any(|e| e.contains("route PO")));
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_warnings_wait_for_confirmation() {
        let workflow = workflow(Vec::new());
        // Gentamicin is high-alert: a warning, not an error.
        let outcome = workflow
            .run(&request(false, vec![medication("GENTA-INJ", 80.0, "IV", "Q8H")]))
            .await;

        match outcome {
            WorkflowOutcome::NeedsConfirmation { warnings } => {
                assert!(warnings.iter().any(|w| w.contains("high-alert")));
            }
            other => panic!("expected NeedsConfirmation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_confirmed_warnings_proceed() {
        let workflow = workflow(Vec::new());
        let outcome = workflow
            .run(&request(true, vec![medication("GENTA-INJ", 80.0, "IV", "Q8H")]))
            .await;

        match outcome {
            WorkflowOutcome::Submitted {
                order_ids,
                warnings,
                ..
            } => {
                assert_eq!(order_ids.len(), 1);
                assert!(!warnings.is_empty());
            }
            other => panic!("expected Submitted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_contraindicated_interaction_rejects() {
        let workflow = workflow(vec![InteractionRecord {
            drug_a: "genta".into(),
            drug_b: "vanco".into(),
            severity: InteractionSeverity::Contraindicated,
            description: "additive nephrotoxicity".into(),
            recommendation: "do not combine".into(),
        }]);

        let outcome = workflow
            .run(&request(
                true,
                vec![
                    medication("GENTA-INJ", 80.0, "IV", "Q8H"),
                    medication("VANCO-INJ", 1000.0, "IV", "Q12H"),
                ],
            ))
            .await;

        match outcome {
            WorkflowOutcome::Rejected { errors } => {
                assert!(errors.iter().any(|e| e.contains("do not combine")));
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }
}
