//! Hospital formulary: the approved drug list with dosing and route limits.
//!
//! Loaded once at startup from `formulary.json` and held immutable for the
//! process lifetime, so lookups need no locking and are safe from any number
//! of concurrent callers.

use crate::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// One approved drug in the hospital formulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormularyItem {
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
    #[serde(default)]
    pub nhi_code: Option<String>,
    #[serde(default)]
    pub atc_code: Option<String>,
    #[serde(default)]
    pub requires_renal_adjustment: bool,
    #[serde(default)]
    pub high_alert: bool,
}

impl FormularyItem {
    /// Check the structural invariants a formulary entry must satisfy.
    fn validate(&self) -> CoreResult<()> {
        if self.available_routes.is_empty() {
            return Err(CoreError::DataInvalid(format!(
                "formulary item {} has no available routes",
                self.drug_code
            )));
        }
        if self.min_dose <= 0.0 || self.max_dose <= 0.0 || self.min_dose > self.max_dose {
            return Err(CoreError::DataInvalid(format!(
                "formulary item {} has an invalid dose range {}-{}",
                self.drug_code, self.min_dose, self.max_dose
            )));
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct FormularyFile {
    #[serde(default)]
    items: Vec<FormularyItem>,
}

/// Read-only formulary lookup keyed by drug code.
#[derive(Debug, Clone, Default)]
pub struct Formulary {
    items: HashMap<String, FormularyItem>,
}

impl Formulary {
    /// Load the formulary from a JSON data file.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DataFileMissing`] if the file does not exist,
    /// [`CoreError::DataFileRead`] / [`CoreError::DataFileParse`] on IO or
    /// JSON failures, and [`CoreError::DataInvalid`] if an entry violates
    /// the formulary invariants (empty route list, inverted dose range).
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.is_file() {
            return Err(CoreError::DataFileMissing(path.to_path_buf()));
        }
        let contents = fs::read_to_string(path).map_err(CoreError::DataFileRead)?;
        let file: FormularyFile =
            serde_json::from_str(&contents).map_err(CoreError::DataFileParse)?;
        Self::from_items(file.items)
    }

    /// Build a formulary from in-memory items. Used by tests and embedders.
    pub fn from_items(items: Vec<FormularyItem>) -> CoreResult<Self> {
        let mut map = HashMap::with_capacity(items.len());
        for item in items {
            item.validate()?;
            map.insert(item.drug_code.clone(), item);
        }
        Ok(Self { items: map })
    }

    /// Look up a drug by its exact code.
    pub fn get(&self, drug_code: &str) -> Option<&FormularyItem> {
        self.items.get(drug_code)
    }

    /// Case-insensitive substring search over code, brand name and generic
    /// name, truncated to `limit` results.
    pub fn search(&self, query: &str, limit: usize) -> Vec<&FormularyItem> {
        let query = query.to_lowercase();
        let mut results = Vec::new();
        for item in self.items.values() {
            if item.drug_code.to_lowercase().contains(&query)
                || item.drug_name.to_lowercase().contains(&query)
                || item.generic_name.to_lowercase().contains(&query)
            {
                results.push(item);
                if results.len() >= limit {
                    break;
                }
            }
        }
        results
    }

    pub fn high_alert_items(&self) -> Vec<&FormularyItem> {
        self.items.values().filter(|i| i.high_alert).collect()
    }

    pub fn renal_adjustment_items(&self) -> Vec<&FormularyItem> {
        self.items
            .values()
            .filter(|i| i.requires_renal_adjustment)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(drug_code: &str) -> FormularyItem {
        FormularyItem {
            drug_code: drug_code.to_string(),
            drug_name: format!("{drug_code} brand"),
            generic_name: drug_code.to_lowercase(),
            strength: "100mg".into(),
            unit: "mg".into(),
            dosage_form: "tablet".into(),
            available_routes: vec!["PO".into()],
            min_dose: 50.0,
            max_dose: 200.0,
            default_frequency: "BID".into(),
            nhi_code: None,
            atc_code: None,
            requires_renal_adjustment: false,
            high_alert: false,
        }
    }

    #[test]
    fn test_get_existing_and_missing() {
        let formulary = Formulary::from_items(vec![item("AMOXI-CAP")]).unwrap();
        assert!(formulary.get("AMOXI-CAP").is_some());
        assert!(formulary.get("NONEXISTENT").is_none());
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let formulary =
            Formulary::from_items(vec![item("AMOXI-CAP"), item("GENTA-INJ")]).unwrap();

        let results = formulary.search("amoxi", 10);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].drug_code, "AMOXI-CAP");
    }

    #[test]
    fn test_search_honours_limit() {
        let formulary =
            Formulary::from_items(vec![item("DRUG-A"), item("DRUG-B"), item("DRUG-C")]).unwrap();
        assert_eq!(formulary.search("drug", 2).len(), 2);
    }

    #[test]
    fn test_rejects_empty_route_list() {
        let mut bad = item("BAD-ITEM");
        bad.available_routes.clear();
        let result = Formulary::from_items(vec![bad]);
        assert!(matches!(result, Err(CoreError::DataInvalid(_))));
    }

    #[test]
    fn test_rejects_inverted_dose_range() {
        let mut bad = item("BAD-ITEM");
        bad.min_dose = 300.0;
        let result = Formulary::from_items(vec![bad]);
        assert!(matches!(result, Err(CoreError::DataInvalid(_))));
    }

    #[test]
    fn test_high_alert_listing() {
        let mut warfarin = item("WARFA-TAB");
        warfarin.high_alert = true;
        let formulary = Formulary::from_items(vec![item("AMOXI-CAP"), warfarin]).unwrap();

        let listed = formulary.high_alert_items();
        assert_eq!(listed.len(), 1);
        assert!(listed.iter().all(|i| i.high_alert));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("formulary.json");
        let json = serde_json::json!({
            "items": [{
                "drug_code": "AMOXI-CAP",
                "drug_name": "Amoxicillin 500mg",
                "generic_name": "amoxicillin",
                "strength": "500mg",
                "unit": "mg",
                "dosage_form": "capsule",
                "available_routes": ["PO"],
                "min_dose": 250.0,
                "max_dose": 1000.0,
                "default_frequency": "TID"
            }]
        });
        std::fs::write(&path, json.to_string()).unwrap();

        let formulary = Formulary::load(&path).unwrap();
        assert_eq!(formulary.len(), 1);
        let item = formulary.get("AMOXI-CAP").unwrap();
        assert!(!item.requires_renal_adjustment);
        assert!(!item.high_alert);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Formulary::load(Path::new("/nonexistent/formulary.json"));
        assert!(matches!(result, Err(CoreError::DataFileMissing(_))));
    }
}
