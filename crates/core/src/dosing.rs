//! Dose calculators: weight-based, BSA-based, pediatric, infusion rate and
//! unit conversion. All pure functions; invalid input fails fast.

use crate::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// Result of a weight-based dose calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightBasedDose {
    pub dose_per_kg: f64,
    pub patient_weight_kg: f64,
    pub calculated_dose: f64,
    /// Calculated dose after applying the max-dose cap and rounding.
    pub final_dose: f64,
    pub dose_unit: String,
    pub max_dose: Option<f64>,
    pub capped: bool,
}

/// Calculate a weight-based dose (per-kg dose times body weight).
///
/// `round_to` rounds the final dose to the nearest multiple, e.g. 0.5 for
/// half-tablet increments; pass 0.0 to skip rounding.
///
/// # Errors
///
/// Returns [`CoreError::InvalidInput`] when `dose_per_kg` or
/// `patient_weight_kg` is not strictly positive.
pub fn weight_based_dose(
    dose_per_kg: f64,
    patient_weight_kg: f64,
    dose_unit: &str,
    max_dose: Option<f64>,
    round_to: f64,
) -> CoreResult<WeightBasedDose> {
    if dose_per_kg <= 0.0 || patient_weight_kg <= 0.0 {
        return Err(CoreError::InvalidInput(
            "dose per kg and patient weight must be positive".into(),
        ));
    }

    let calculated_dose = dose_per_kg * patient_weight_kg;
    let (mut final_dose, capped) = match max_dose {
        Some(cap) if calculated_dose > cap => (cap, true),
        _ => (calculated_dose, false),
    };
    if round_to > 0.0 {
        final_dose = (final_dose / round_to).round() * round_to;
    }

    Ok(WeightBasedDose {
        dose_per_kg,
        patient_weight_kg,
        calculated_dose,
        final_dose,
        dose_unit: dose_unit.to_string(),
        max_dose,
        capped,
    })
}

/// Body surface area by the Mosteller formula, in m².
pub fn mosteller_bsa(height_cm: f64, weight_kg: f64) -> f64 {
    ((height_cm * weight_kg) / 3600.0).sqrt()
}

/// Result of a BSA-based dose calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BsaBasedDose {
    pub dose_per_m2: f64,
    pub bsa: f64,
    pub calculated_dose: f64,
    pub final_dose: f64,
    pub dose_unit: String,
    pub max_dose: Option<f64>,
    pub capped: bool,
}

/// Calculate a BSA-based dose (common in oncology).
///
/// # Errors
///
/// Returns [`CoreError::InvalidInput`] when any of `dose_per_m2`,
/// `height_cm` or `weight_kg` is not strictly positive.
pub fn bsa_based_dose(
    dose_per_m2: f64,
    height_cm: f64,
    weight_kg: f64,
    dose_unit: &str,
    max_dose: Option<f64>,
) -> CoreResult<BsaBasedDose> {
    if dose_per_m2 <= 0.0 || height_cm <= 0.0 || weight_kg <= 0.0 {
        return Err(CoreError::InvalidInput(
            "dose per m2, height and weight must be positive".into(),
        ));
    }

    let bsa = mosteller_bsa(height_cm, weight_kg);
    let calculated_dose = dose_per_m2 * bsa;
    let (final_dose, capped) = match max_dose {
        Some(cap) if calculated_dose > cap => (cap, true),
        _ => (calculated_dose, false),
    };

    Ok(BsaBasedDose {
        dose_per_m2,
        bsa,
        calculated_dose,
        final_dose,
        dose_unit: dose_unit.to_string(),
        max_dose,
        capped,
    })
}

/// How a pediatric dose is derived from the adult dose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PediatricMethod {
    /// Clark's rule: scale by weight against a 70 kg adult.
    Weight,
    /// Young's rule: scale by age / (age + 12).
    Age,
    /// Scale by BSA against the 1.73 m² adult reference.
    Bsa,
}

const STANDARD_ADULT_WEIGHT_KG: f64 = 70.0;
const STANDARD_ADULT_BSA_M2: f64 = 1.73;

/// Result of a pediatric dose derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PediatricDose {
    pub adult_dose: f64,
    pub pediatric_dose: f64,
    pub dose_unit: String,
    pub method: PediatricMethod,
}

/// Derive a pediatric dose from the standard adult dose.
///
/// # Errors
///
/// Returns [`CoreError::InvalidInput`] when the adult dose or child weight
/// is not strictly positive, or when the chosen method's parameter
/// (`child_age_years` for [`PediatricMethod::Age`], `child_bsa` for
/// [`PediatricMethod::Bsa`]) is missing or non-positive.
pub fn pediatric_dose(
    adult_dose: f64,
    child_weight_kg: f64,
    method: PediatricMethod,
    child_age_years: Option<u32>,
    child_bsa: Option<f64>,
    dose_unit: &str,
) -> CoreResult<PediatricDose> {
    if adult_dose <= 0.0 || child_weight_kg <= 0.0 {
        return Err(CoreError::InvalidInput(
            "adult dose and child weight must be positive".into(),
        ));
    }

    let pediatric_dose = match method {
        PediatricMethod::Weight => (child_weight_kg / STANDARD_ADULT_WEIGHT_KG) * adult_dose,
        PediatricMethod::Age => {
            let age = child_age_years.ok_or_else(|| {
                CoreError::InvalidInput("child age is required for the age method".into())
            })?;
            (f64::from(age) / (f64::from(age) + 12.0)) * adult_dose
        }
        PediatricMethod::Bsa => {
            let bsa = child_bsa.ok_or_else(|| {
                CoreError::InvalidInput("child BSA is required for the bsa method".into())
            })?;
            if bsa <= 0.0 {
                return Err(CoreError::InvalidInput("child BSA must be positive".into()));
            }
            (bsa / STANDARD_ADULT_BSA_M2) * adult_dose
        }
    };

    Ok(PediatricDose {
        adult_dose,
        pediatric_dose,
        dose_unit: dose_unit.to_string(),
        method,
    })
}

/// Result of an IV infusion rate calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfusionRate {
    pub total_dose: f64,
    pub dose_unit: String,
    pub volume_ml: f64,
    pub duration_hours: f64,
    /// dose units per mL.
    pub concentration: f64,
    pub rate_ml_per_hour: f64,
    pub rate_dose_per_hour: f64,
}

/// Calculate an IV infusion rate.
///
/// # Errors
///
/// Returns [`CoreError::InvalidInput`] when the dose, volume or duration
/// is not strictly positive.
pub fn infusion_rate(
    total_dose: f64,
    dose_unit: &str,
    volume_ml: f64,
    duration_hours: f64,
) -> CoreResult<InfusionRate> {
    if total_dose <= 0.0 || volume_ml <= 0.0 || duration_hours <= 0.0 {
        return Err(CoreError::InvalidInput(
            "dose, volume and duration must be positive".into(),
        ));
    }

    Ok(InfusionRate {
        total_dose,
        dose_unit: dose_unit.to_string(),
        volume_ml,
        duration_hours,
        concentration: total_dose / volume_ml,
        rate_ml_per_hour: volume_ml / duration_hours,
        rate_dose_per_hour: total_dose / duration_hours,
    })
}

/// Factor to milligrams for a supported mass unit.
fn to_mg_factor(unit: &str) -> Option<f64> {
    match unit.trim().to_lowercase().as_str() {
        "g" => Some(1000.0),
        "mg" => Some(1.0),
        "mcg" | "μg" | "ug" => Some(0.001),
        "ng" => Some(0.000_001),
        _ => None,
    }
}

/// Convert a dose between mass units (g, mg, mcg, ng).
///
/// # Errors
///
/// Returns [`CoreError::InvalidInput`] for unsupported units.
pub fn convert_dose_units(value: f64, from_unit: &str, to_unit: &str) -> CoreResult<f64> {
    let from = to_mg_factor(from_unit).ok_or_else(|| {
        CoreError::InvalidInput(format!("unsupported dose unit {from_unit:?}"))
    })?;
    let to = to_mg_factor(to_unit)
        .ok_or_else(|| CoreError::InvalidInput(format!("unsupported dose unit {to_unit:?}")))?;

    Ok(value * from / to)
}
