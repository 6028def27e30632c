//! Order validation: the decision engine.
//!
//! Classifies a proposed medication order against the formulary and the
//! renal adjustment table. Pure and synchronous: the verdict is a function
//! of the arguments and the two read-only reference tables, so calls are
//! deterministic and safe from any number of threads.

use crate::formulary::Formulary;
use crate::renal::RenalDosing;
use crate::results::{SuggestedAdjustment, ValidationResult};
use std::sync::Arc;

/// Validates proposed orders against the hospital's reference tables.
#[derive(Clone)]
pub struct OrderValidator {
    formulary: Arc<Formulary>,
    renal_dosing: Arc<RenalDosing>,
}

impl OrderValidator {
    pub fn new(formulary: Arc<Formulary>, renal_dosing: Arc<RenalDosing>) -> Self {
        Self {
            formulary,
            renal_dosing,
        }
    }

    /// Validate a single proposed order.
    ///
    /// Checks run in a fixed sequence and their findings accumulate:
    ///
    /// 1. the drug must exist in the formulary (the only short-circuit:
    ///    nothing else can be checked without the item);
    /// 2. the route must be one of the item's available routes (error);
    /// 3. a dose outside the recommended range is a warning, never an
    ///    error, since clinical judgment may justify it — exact boundary
    ///    values are in range;
    /// 4. high-alert drugs always get an informational warning;
    /// 5. when a CrCl is supplied and the item requires renal adjustment,
    ///    a contraindicated range is an error, and a needed adjustment is
    ///    a warning with the suggested frequency attached.
    ///
    /// `dose_unit` and `frequency` are carried for message text only; no
    /// unit conversion is attempted against the formulary unit.
    pub fn validate(
        &self,
        drug_code: &str,
        dose: f64,
        dose_unit: &str,
        route: &str,
        _frequency: &str,
        patient_crcl: Option<f64>,
    ) -> ValidationResult {
        let mut errors: Vec<String> = Vec::new();
        let mut warnings: Vec<String> = Vec::new();
        let mut suggested: Option<SuggestedAdjustment> = None;

        let Some(item) = self.formulary.get(drug_code) else {
            return ValidationResult::failure(
                vec![format!(
                    "drug code {drug_code} is not in the hospital formulary"
                )],
                Vec::new(),
            );
        };

        if !item.available_routes.iter().any(|r| r == route) {
            errors.push(format!(
                "route {route} is not available for this drug, available routes: {}",
                item.available_routes.join(", ")
            ));
        }

        if dose < item.min_dose {
            warnings.push(format!(
                "dose {dose} {dose_unit} is below the recommended minimum {} {}",
                item.min_dose, item.unit
            ));
        } else if dose > item.max_dose {
            warnings.push(format!(
                "dose {dose} {dose_unit} exceeds the recommended maximum {} {}",
                item.max_dose, item.unit
            ));
        }

        if item.high_alert {
            warnings.push(format!("high-alert drug: {}", item.drug_name));
        }

        if let Some(crcl) = patient_crcl {
            if item.requires_renal_adjustment {
                let adjustment = self.renal_dosing.adjustment_for(drug_code, crcl);

                if adjustment.contraindicated {
                    errors.push(format!(
                        "CrCl {crcl:.1} mL/min: {}",
                        adjustment.recommendation
                    ));
                } else if adjustment.needs_adjustment {
                    warnings.push(format!(
                        "CrCl {crcl:.1} mL/min: {}",
                        adjustment.recommendation
                    ));
                    suggested = Some(SuggestedAdjustment {
                        needs_renal_adjustment: true,
                        suggested_frequency: adjustment.suggested_frequency,
                        recommendation: adjustment.recommendation,
                    });
                }
            }
        }

        if !errors.is_empty() {
            return ValidationResult::failure(errors, warnings);
        }
        if let Some(adjustment) = suggested {
            return ValidationResult::with_adjustment(warnings, adjustment);
        }
        ValidationResult::success(warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formulary::FormularyItem;
    use crate::renal::tests::{metformin_rule, vanco_rule};

    fn gentamicin() -> FormularyItem {
        FormularyItem {
            drug_code: "GENTA-INJ".into(),
            drug_name: "Gentamicin 80mg/2mL".into(),
            generic_name: "gentamicin".into(),
            strength: "80mg/2mL".into(),
            unit: "mg".into(),
            dosage_form: "injection".into(),
            available_routes: vec!["IV".into(), "IM".into()],
            min_dose: 60.0,
            max_dose: 240.0,
            default_frequency: "Q8H".into(),
            nhi_code: None,
            atc_code: Some("J01GB03".into()),
            requires_renal_adjustment: true,
            high_alert: true,
        }
    }

    fn vancomycin() -> FormularyItem {
        FormularyItem {
            drug_code: "VANCO-INJ".into(),
            drug_name: "Vancomycin 500mg".into(),
            generic_name: "vancomycin".into(),
            strength: "500mg".into(),
            unit: "mg".into(),
            dosage_form: "injection".into(),
            available_routes: vec!["IV".into()],
            min_dose: 500.0,
            max_dose: 2000.0,
            default_frequency: "Q12H".into(),
            nhi_code: None,
            atc_code: Some("J01XA01".into()),
            requires_renal_adjustment: true,
            high_alert: false,
        }
    }

    fn metformin() -> FormularyItem {
        FormularyItem {
            drug_code: "METFOR-TAB".into(),
            drug_name: "Metformin 500mg".into(),
            generic_name: "metformin".into(),
            strength: "500mg".into(),
            unit: "mg".into(),
            dosage_form: "tablet".into(),
            available_routes: vec!["PO".into()],
            min_dose: 250.0,
            max_dose: 2550.0,
            default_frequency: "BID".into(),
            nhi_code: None,
            atc_code: Some("A10BA02".into()),
            requires_renal_adjustment: true,
            high_alert: false,
        }
    }

    fn validator() -> OrderValidator {
        let formulary =
            Formulary::from_items(vec![gentamicin(), vancomycin(), metformin()]).unwrap();
        let renal = RenalDosing::from_rules(vec![
            ("VANCO-INJ".into(), vanco_rule()),
            ("METFOR-TAB".into(), metformin_rule()),
        ]);
        OrderValidator::new(Arc::new(formulary), Arc::new(renal))
    }

    #[test]
    fn test_unknown_drug_short_circuits() {
        let result = validator().validate("NONEXISTENT", 100.0, "mg", "IV", "QD", Some(10.0));
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("not in the hospital formulary"));
        // No other check may run, even with a CrCl that would otherwise fire.
        assert!(result.warnings.is_empty());
        assert!(result.suggested_adjustments.is_none());
    }

    #[test]
    fn test_valid_order_passes() {
        let result = validator().validate("METFOR-TAB", 500.0, "mg", "PO", "BID", None);
        assert!(result.valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_disallowed_route_is_blocking() {
        let result = validator().validate("GENTA-INJ", 80.0, "mg", "PO", "Q8H", None);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("IV, IM"));
    }

    #[test]
    fn test_dose_below_minimum_warns() {
        let result = validator().validate("GENTA-INJ", 40.0, "mg", "IV", "Q8H", None);
        assert!(result.valid);
        let dose_warnings: Vec<_> = result
            .warnings
            .iter()
            .filter(|w| w.contains("minimum"))
            .collect();
        assert_eq!(dose_warnings.len(), 1);
        assert!(!result.warnings.iter().any(|w| w.contains("maximum")));
    }

    #[test]
    fn test_dose_above_maximum_warns() {
        let result = validator().validate("GENTA-INJ", 500.0, "mg", "IV", "Q8H", None);
        assert!(result.valid);
        let dose_warnings: Vec<_> = result
            .warnings
            .iter()
            .filter(|w| w.contains("maximum"))
            .collect();
        assert_eq!(dose_warnings.len(), 1);
        assert!(!result.warnings.iter().any(|w| w.contains("minimum")));
    }

    #[test]
    fn test_dose_boundaries_are_inclusive() {
        let validator = validator();
        for dose in [60.0, 240.0] {
            let result = validator.validate("GENTA-INJ", dose, "mg", "IV", "Q8H", None);
            assert!(
                !result
                    .warnings
                    .iter()
                    .any(|w| w.contains("minimum") || w.contains("maximum")),
                "boundary dose {dose} must not warn"
            );
        }
    }

    #[test]
    fn test_high_alert_warning() {
        let result = validator().validate("GENTA-INJ", 80.0, "mg", "IV", "Q8H", None);
        assert!(result.valid);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("high-alert drug")));
    }

    #[test]
    fn test_contraindicated_renal_range_is_blocking() {
        let result = validator().validate("METFOR-TAB", 500.0, "mg", "PO", "BID", Some(20.0));
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.contains("CrCl 20.0")));
        assert!(result
            .errors
            .iter()
            .any(|e| e.contains("lactic acidosis")));
        assert!(result.suggested_adjustments.is_none());
    }

    #[test]
    fn test_renal_adjustment_is_advisory() {
        let result = validator().validate("VANCO-INJ", 1000.0, "mg", "IV", "Q12H", Some(35.0));
        assert!(result.valid);
        assert!(!result.warnings.is_empty());

        let adjustment = result.suggested_adjustments.expect("adjustment expected");
        assert!(adjustment.needs_renal_adjustment);
        assert_eq!(adjustment.suggested_frequency.as_deref(), Some("Q24H"));
        assert!(result.warnings.iter().any(|w| w.contains("CrCl 35.0")));
    }

    #[test]
    fn test_normal_renal_function_adds_nothing() {
        let result = validator().validate("VANCO-INJ", 1000.0, "mg", "IV", "Q12H", Some(80.0));
        assert!(result.valid);
        assert!(result.warnings.is_empty());
        assert!(result.suggested_adjustments.is_none());
    }

    #[test]
    fn test_renal_check_skipped_without_crcl() {
        let result = validator().validate("METFOR-TAB", 500.0, "mg", "PO", "BID", None);
        assert!(result.valid);
        assert!(result.suggested_adjustments.is_none());
    }

    #[test]
    fn test_route_error_and_renal_error_accumulate() {
        // Wrong route AND contraindicated CrCl: both findings must surface.
        let result = validator().validate("METFOR-TAB", 500.0, "mg", "IV", "BID", Some(15.0));
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn test_warnings_survive_a_failing_result() {
        // Over-maximum dose (warning) with a bad route (error).
        let result = validator().validate("GENTA-INJ", 500.0, "mg", "PO", "Q8H", None);
        assert!(!result.valid);
        assert!(result.warnings.iter().any(|w| w.contains("maximum")));
    }

    #[test]
    fn test_validation_is_deterministic() {
        let validator = validator();
        let first = validator.validate("VANCO-INJ", 1000.0, "mg", "IV", "Q12H", Some(35.0));
        let second = validator.validate("VANCO-INJ", 1000.0, "mg", "IV", "Q12H", Some(35.0));
        assert_eq!(first, second);
    }
}
