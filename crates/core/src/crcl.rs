//! Renal function estimation (Cockcroft-Gault).

use crate::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Patient sex as used by the Cockcroft-Gault equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl FromStr for Sex {
    type Err = CoreError;

    /// Accepts `m`/`male`/`f`/`female`, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] for anything else; sex changes
    /// the estimate by 15%, so a silent default would be unsafe.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "m" | "male" => Ok(Sex::Male),
            "f" | "female" => Ok(Sex::Female),
            other => Err(CoreError::InvalidInput(format!(
                "unrecognised sex {other:?} (expected m/male/f/female)"
            ))),
        }
    }
}

/// Interpretation band for an estimated CrCl. Informational only: the order
/// validator works from the raw value, never the band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenalCategory {
    Normal,
    Mild,
    Moderate,
    Severe,
    EndStage,
}

impl RenalCategory {
    pub fn from_crcl(crcl: f64) -> Self {
        if crcl >= 90.0 {
            RenalCategory::Normal
        } else if crcl >= 60.0 {
            RenalCategory::Mild
        } else if crcl >= 30.0 {
            RenalCategory::Moderate
        } else if crcl >= 15.0 {
            RenalCategory::Severe
        } else {
            RenalCategory::EndStage
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RenalCategory::Normal => "Normal",
            RenalCategory::Mild => "Mild impairment",
            RenalCategory::Moderate => "Moderate impairment",
            RenalCategory::Severe => "Severe impairment",
            RenalCategory::EndStage => "End-stage renal disease",
        }
    }
}

impl fmt::Display for RenalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Estimated creatinine clearance, rounded to one decimal for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrclEstimate {
    /// mL/min.
    pub value: f64,
    pub category: RenalCategory,
}

/// Estimate creatinine clearance with the Cockcroft-Gault equation.
///
/// `crcl = ((140 - age) * weight_kg) / (72 * serum_creatinine)`, multiplied
/// by 0.85 for female patients. The result is rounded to one decimal place.
///
/// # Errors
///
/// Returns [`CoreError::InvalidInput`] when `serum_creatinine` is not
/// strictly positive; the equation divides by it and a non-positive value
/// is physiologically meaningless.
pub fn estimate_crcl(
    age_years: u32,
    weight_kg: f64,
    serum_creatinine: f64,
    sex: Sex,
) -> CoreResult<CrclEstimate> {
    if serum_creatinine <= 0.0 {
        return Err(CoreError::InvalidInput(
            "serum creatinine must be positive".into(),
        ));
    }

    let mut crcl = ((140.0 - f64::from(age_years)) * weight_kg) / (72.0 * serum_creatinine);
    if sex == Sex::Female {
        crcl *= 0.85;
    }

    let value = (crcl * 10.0).round() / 10.0;
    Ok(CrclEstimate {
        value,
        category: RenalCategory::from_crcl(value),
    })
}
