//! Renal dose adjustment table.
//!
//! Per-drug sets of CrCl-bounded ranges, each carrying a dose multiplier,
//! an optional replacement frequency, a contraindication flag and a
//! free-text recommendation. Loaded once from `renal_adjustments.json` and
//! read-only afterwards.

use crate::results::RenalAdjustment;
use crate::{CoreError, CoreResult};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

fn default_dose_adjustment() -> f64 {
    1.0
}

/// One CrCl range of a drug's adjustment rule. Bounds are inclusive.
#[derive(Debug, Clone, Deserialize)]
pub struct CrclRange {
    pub crcl_min: f64,
    pub crcl_max: f64,
    /// Dose multiplier; 1.0 means the dose itself is unchanged.
    #[serde(default = "default_dose_adjustment")]
    pub dose_adjustment: f64,
    /// Replacement dosing frequency, when the interval changes.
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub contraindicated: bool,
    #[serde(default)]
    pub recommendation: String,
}

impl CrclRange {
    fn contains(&self, crcl: f64) -> bool {
        self.crcl_min <= crcl && crcl <= self.crcl_max
    }

    fn display_range(&self) -> String {
        format!("{}-{}", self.crcl_min, self.crcl_max)
    }
}

/// A drug's full renal adjustment rule: its normal dose and ordered ranges.
#[derive(Debug, Clone, Deserialize)]
pub struct RenalRule {
    /// Normal dosing as text, e.g. "80 mg Q8H". The trailing token is taken
    /// as the normal frequency when deciding whether a range changes it.
    #[serde(default)]
    pub normal_dose: Option<String>,
    pub ranges: Vec<CrclRange>,
}

impl RenalRule {
    fn normal_frequency(&self) -> Option<&str> {
        self.normal_dose
            .as_deref()
            .and_then(|dose| dose.split_whitespace().last())
    }
}

#[derive(Deserialize)]
struct RenalFile {
    #[serde(default)]
    adjustments: HashMap<String, RenalRule>,
}

/// Read-only renal adjustment lookup keyed by drug code.
#[derive(Debug, Clone, Default)]
pub struct RenalDosing {
    adjustments: HashMap<String, RenalRule>,
}

impl RenalDosing {
    /// Load the adjustment table from a JSON data file.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DataFileMissing`] if the file does not exist and
    /// [`CoreError::DataFileRead`] / [`CoreError::DataFileParse`] on IO or
    /// JSON failures.
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.is_file() {
            return Err(CoreError::DataFileMissing(path.to_path_buf()));
        }
        let contents = fs::read_to_string(path).map_err(CoreError::DataFileRead)?;
        let file: RenalFile = serde_json::from_str(&contents).map_err(CoreError::DataFileParse)?;
        Ok(Self {
            adjustments: file.adjustments,
        })
    }

    /// Build a table from in-memory rules. Used by tests and embedders.
    pub fn from_rules(rules: Vec<(String, RenalRule)>) -> Self {
        Self {
            adjustments: rules.into_iter().collect(),
        }
    }

    /// Look up the adjustment for a drug at a specific CrCl.
    ///
    /// Drugs without a rule set get a "not applicable" adjustment. Drugs
    /// with rules but no matching range get a non-blocking "no rule
    /// matched" adjustment; that case is logged, since a gap in a table
    /// that is supposed to be exhaustive deserves operator attention.
    pub fn adjustment_for(&self, drug_code: &str, crcl: f64) -> RenalAdjustment {
        let Some(rule) = self.adjustments.get(drug_code) else {
            return RenalAdjustment::not_applicable(drug_code);
        };

        for range in &rule.ranges {
            if !range.contains(crcl) {
                continue;
            }

            let frequency_changed = match (range.frequency.as_deref(), rule.normal_frequency()) {
                (Some(suggested), Some(normal)) => suggested != normal,
                _ => false,
            };
            let needs_adjustment =
                range.dose_adjustment != 1.0 || range.contraindicated || frequency_changed;

            return RenalAdjustment {
                drug_code: drug_code.to_string(),
                crcl_range: range.display_range(),
                needs_adjustment,
                recommendation: range.recommendation.clone(),
                suggested_dose: None,
                suggested_frequency: range.frequency.clone(),
                contraindicated: range.contraindicated,
            };
        }

        tracing::warn!(drug_code, crcl, "no renal adjustment range matched");
        RenalAdjustment::no_rule_matched(drug_code, crcl)
    }

    /// Whether the drug is contraindicated at this CrCl.
    pub fn is_contraindicated(&self, drug_code: &str, crcl: f64) -> bool {
        self.adjustment_for(drug_code, crcl).contraindicated
    }

    /// Drug codes that have adjustment rules.
    pub fn drugs_with_rules(&self) -> Vec<&str> {
        self.adjustments.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.adjustments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjustments.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn range(
        crcl_min: f64,
        crcl_max: f64,
        dose_adjustment: f64,
        frequency: Option<&str>,
        contraindicated: bool,
        recommendation: &str,
    ) -> CrclRange {
        CrclRange {
            crcl_min,
            crcl_max,
            dose_adjustment,
            frequency: frequency.map(str::to_string),
            contraindicated,
            recommendation: recommendation.to_string(),
        }
    }

    /// Vancomycin-style rule: interval extension as CrCl falls.
    pub(crate) fn vanco_rule() -> RenalRule {
        RenalRule {
            normal_dose: Some("1000 mg Q12H".into()),
            ranges: vec![
                range(50.0, 999.0, 1.0, Some("Q12H"), false, "no change required"),
                range(
                    30.0,
                    49.9,
                    1.0,
                    Some("Q24H"),
                    false,
                    "extend dosing interval to Q24H",
                ),
                range(
                    10.0,
                    29.9,
                    1.0,
                    Some("Q48H"),
                    false,
                    "extend dosing interval to Q48H and monitor levels",
                ),
            ],
        }
    }

    /// Metformin-style rule: contraindicated below a floor.
    pub(crate) fn metformin_rule() -> RenalRule {
        RenalRule {
            normal_dose: Some("500 mg BID".into()),
            ranges: vec![
                range(60.0, 999.0, 1.0, Some("BID"), false, "no change required"),
                range(
                    30.0,
                    59.9,
                    0.5,
                    Some("QD"),
                    false,
                    "halve the total daily dose",
                ),
                range(
                    0.0,
                    29.9,
                    0.0,
                    None,
                    true,
                    "contraindicated below CrCl 30, risk of lactic acidosis",
                ),
            ],
        }
    }

    fn table() -> RenalDosing {
        RenalDosing::from_rules(vec![
            ("VANCO-INJ".into(), vanco_rule()),
            ("METFOR-TAB".into(), metformin_rule()),
        ])
    }

    #[test]
    fn test_unknown_drug_is_not_applicable() {
        let adj = table().adjustment_for("UNKNOWN-DRUG", 30.0);
        assert!(!adj.needs_adjustment);
        assert!(!adj.contraindicated);
        assert_eq!(adj.crcl_range, "N/A");
    }

    #[test]
    fn test_frequency_change_needs_adjustment() {
        // dose_adjustment stays 1.0 but Q12H becomes Q24H.
        let adj = table().adjustment_for("VANCO-INJ", 35.0);
        assert!(adj.needs_adjustment);
        assert!(!adj.contraindicated);
        assert_eq!(adj.suggested_frequency.as_deref(), Some("Q24H"));
        assert_eq!(adj.crcl_range, "30-49.9");
    }

    #[test]
    fn test_unchanged_range_needs_no_adjustment() {
        let adj = table().adjustment_for("VANCO-INJ", 80.0);
        assert!(!adj.needs_adjustment);
        assert_eq!(adj.suggested_frequency.as_deref(), Some("Q12H"));
    }

    #[test]
    fn test_contraindicated_range() {
        let adj = table().adjustment_for("METFOR-TAB", 20.0);
        assert!(adj.contraindicated);
        assert!(adj.needs_adjustment);
        assert!(adj.recommendation.contains("contraindicated"));
    }

    #[test]
    fn test_dose_multiplier_needs_adjustment() {
        let adj = table().adjustment_for("METFOR-TAB", 45.0);
        assert!(adj.needs_adjustment);
        assert!(!adj.contraindicated);
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let adj_low = table().adjustment_for("VANCO-INJ", 30.0);
        assert_eq!(adj_low.crcl_range, "30-49.9");

        let adj_high = table().adjustment_for("VANCO-INJ", 49.9);
        assert_eq!(adj_high.crcl_range, "30-49.9");
    }

    #[test]
    fn test_gap_yields_no_rule_matched() {
        let gappy = RenalDosing::from_rules(vec![(
            "GAPPY-INJ".into(),
            RenalRule {
                normal_dose: None,
                ranges: vec![range(50.0, 999.0, 1.0, None, false, "no change")],
            },
        )]);

        let adj = gappy.adjustment_for("GAPPY-INJ", 20.0);
        assert!(!adj.needs_adjustment);
        assert_eq!(adj.crcl_range, "unknown");
        assert!(adj.recommendation.contains("no adjustment rule matched"));
    }

    #[test]
    fn test_is_contraindicated() {
        let table = table();
        assert!(table.is_contraindicated("METFOR-TAB", 15.0));
        assert!(!table.is_contraindicated("METFOR-TAB", 70.0));
        assert!(!table.is_contraindicated("UNKNOWN-DRUG", 15.0));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("renal_adjustments.json");
        let json = serde_json::json!({
            "adjustments": {
                "VANCO-INJ": {
                    "normal_dose": "1000 mg Q12H",
                    "ranges": [
                        {"crcl_min": 30.0, "crcl_max": 49.9, "frequency": "Q24H",
                         "recommendation": "extend dosing interval to Q24H"}
                    ]
                }
            }
        });
        std::fs::write(&path, json.to_string()).unwrap();

        let table = RenalDosing::load(&path).unwrap();
        assert_eq!(table.len(), 1);
        let adj = table.adjustment_for("VANCO-INJ", 40.0);
        assert!(adj.needs_adjustment);
    }
}
