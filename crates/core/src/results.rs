//! Result value objects for validation, submission and discontinuation.
//!
//! Business-rule outcomes are values, never errors: the validator describes
//! every finding in a [`ValidationResult`] and the gateway reports HIS
//! outcomes through [`OrderResult`] / [`StopResult`]. All of these are
//! immutable once constructed.

use serde::{Deserialize, Serialize};

/// Advisory renal adjustment attached to a passing validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedAdjustment {
    pub needs_renal_adjustment: bool,
    pub suggested_frequency: Option<String>,
    pub recommendation: String,
}

/// Outcome of validating a proposed medication order.
///
/// Any entry in `errors` implies `valid == false`. Warnings never affect
/// `valid`. `suggested_adjustments` is only populated for passing results
/// that carry a renal-adjustment warning, so a present adjustment always
/// comes with at least one warning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub suggested_adjustments: Option<SuggestedAdjustment>,
}

impl ValidationResult {
    /// A passing result, optionally carrying advisory warnings.
    pub fn success(warnings: Vec<String>) -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings,
            suggested_adjustments: None,
        }
    }

    /// A failing result. `errors` must describe every blocking finding.
    pub fn failure(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            valid: false,
            errors,
            warnings,
            suggested_adjustments: None,
        }
    }

    /// A passing result with a suggested renal adjustment.
    ///
    /// Adjustments are advisory: the warning list must already contain the
    /// matching renal warning, so the caller is never handed a silent
    /// adjustment.
    pub fn with_adjustment(warnings: Vec<String>, adjustment: SuggestedAdjustment) -> Self {
        debug_assert!(!warnings.is_empty());
        Self {
            valid: true,
            errors: Vec::new(),
            warnings,
            suggested_adjustments: Some(adjustment),
        }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Renal dose adjustment for a drug at a specific creatinine clearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenalAdjustment {
    pub drug_code: String,
    /// Human-readable description of the matched CrCl range.
    pub crcl_range: String,
    pub needs_adjustment: bool,
    pub recommendation: String,
    pub suggested_dose: Option<f64>,
    pub suggested_frequency: Option<String>,
    pub contraindicated: bool,
}

impl RenalAdjustment {
    /// The drug has no renal adjustment rule set at all.
    pub fn not_applicable(drug_code: &str) -> Self {
        Self {
            drug_code: drug_code.to_string(),
            crcl_range: "N/A".to_string(),
            needs_adjustment: false,
            recommendation: "no renal adjustment data for this drug".to_string(),
            suggested_dose: None,
            suggested_frequency: None,
            contraindicated: false,
        }
    }

    /// The drug has rules, but none of its ranges covers this CrCl.
    pub fn no_rule_matched(drug_code: &str, crcl: f64) -> Self {
        Self {
            drug_code: drug_code.to_string(),
            crcl_range: "unknown".to_string(),
            needs_adjustment: false,
            recommendation: format!("no adjustment rule matched CrCl {crcl}"),
            suggested_dose: None,
            suggested_frequency: None,
            contraindicated: false,
        }
    }
}

/// Outcome of submitting an order to the HIS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderResult {
    pub success: bool,
    pub order_id: Option<String>,
    pub message: String,
    pub errors: Vec<String>,
}

impl OrderResult {
    pub fn ok(order_id: String, message: String) -> Self {
        Self {
            success: true,
            order_id: Some(order_id),
            message,
            errors: Vec::new(),
        }
    }

    pub fn fail(errors: Vec<String>, message: String) -> Self {
        Self {
            success: false,
            order_id: None,
            message,
            errors,
        }
    }
}

/// Outcome of discontinuing an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopResult {
    pub success: bool,
    pub message: String,
}

impl StopResult {
    pub fn ok(message: String) -> Self {
        Self {
            success: true,
            message,
        }
    }

    pub fn fail(message: String) -> Self {
        Self {
            success: false,
            message,
        }
    }
}
