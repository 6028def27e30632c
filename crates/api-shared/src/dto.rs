//! Request and response records for the HTTP tool surface.
//!
//! All payloads are plain structured records: string/number/bool fields and
//! nested records or lists. No binary framing.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Orders -------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ValidateOrderReq {
    pub drug_code: String,
    pub dose: f64,
    pub dose_unit: String,
    pub route: String,
    pub frequency: String,
    /// Patient creatinine clearance in mL/min, when already computed.
    #[serde(default)]
    pub patient_crcl: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SuggestedAdjustmentRes {
    pub needs_renal_adjustment: bool,
    pub suggested_frequency: Option<String>,
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ValidationRes {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub suggested_adjustments: Option<SuggestedAdjustmentRes>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitOrderReq {
    pub patient_id: String,
    pub drug_code: String,
    pub dose: f64,
    pub dose_unit: String,
    pub route: String,
    pub frequency: String,
    pub duration_days: u32,
    pub physician_id: String,
    #[serde(default)]
    pub notes: Option<String>,
    /// Patient creatinine clearance in mL/min, when already computed.
    #[serde(default)]
    pub patient_crcl: Option<f64>,
    /// Acknowledge validation warnings and submit anyway.
    #[serde(default)]
    pub override_warnings: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderRes {
    pub success: bool,
    pub order_id: Option<String>,
    pub message: String,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StopOrderReq {
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StopRes {
    pub success: bool,
    pub message: String,
}

// Formulary ----------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FormularyItemRes {
    pub drug_code: String,
    pub drug_name: String,
    pub generic_name: String,
    pub strength: String,
    pub unit: String,
    pub dosage_form: String,
    pub available_routes: Vec<String>,
    pub min_dose: f64,
    pub max_dose: f64,
    pub default_frequency: String,
    pub nhi_code: Option<String>,
    pub atc_code: Option<String>,
    pub requires_renal_adjustment: bool,
    pub high_alert: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FormularyListRes {
    pub items: Vec<FormularyItemRes>,
}

// Renal function -----------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CrclReq {
    pub age_years: u32,
    pub weight_kg: f64,
    /// Serum creatinine in mg/dL.
    pub serum_creatinine: f64,
    /// m/male/f/female, case-insensitive.
    pub sex: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CrclRes {
    pub value: f64,
    pub unit: String,
    pub category: String,
    pub formula: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RenalAdjustmentRes {
    pub drug_code: String,
    pub crcl_range: String,
    pub needs_adjustment: bool,
    pub recommendation: String,
    pub suggested_dose: Option<f64>,
    pub suggested_frequency: Option<String>,
    pub contraindicated: bool,
}

// Interactions -------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InteractionCheckReq {
    /// Generic drug names to check pairwise.
    pub drugs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InteractionRes {
    pub drug_a: String,
    pub drug_b: String,
    pub severity: String,
    pub description: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InteractionCheckRes {
    pub interactions: Vec<InteractionRes>,
}

// Dosing -------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WeightBasedDoseReq {
    pub dose_per_kg: f64,
    pub patient_weight_kg: f64,
    #[serde(default = "default_dose_unit")]
    pub dose_unit: String,
    #[serde(default)]
    pub max_dose: Option<f64>,
    /// Round the final dose to the nearest multiple; 0 disables rounding.
    #[serde(default = "default_round_to")]
    pub round_to: f64,
}

fn default_dose_unit() -> String {
    "mg".to_string()
}

fn default_round_to() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WeightBasedDoseRes {
    pub dose_per_kg: f64,
    pub patient_weight_kg: f64,
    pub calculated_dose: f64,
    pub final_dose: f64,
    pub dose_unit: String,
    pub max_dose: Option<f64>,
    pub capped: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InfusionRateReq {
    pub total_dose: f64,
    pub dose_unit: String,
    pub volume_ml: f64,
    pub duration_hours: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InfusionRateRes {
    pub total_dose: f64,
    pub dose_unit: String,
    pub volume_ml: f64,
    pub duration_hours: f64,
    pub concentration: f64,
    pub rate_ml_per_hour: f64,
    pub rate_dose_per_hour: f64,
}

// Health -------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}
