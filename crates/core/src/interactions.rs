//! Drug–drug interaction index.
//!
//! Records are keyed by a normalized unordered pair of generic names and
//! looked up by exact match only. Substring matching is deliberately
//! avoided: a partial match like "statin" against unrelated drug names
//! produces false positives.

use crate::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionSeverity {
    Minor,
    Moderate,
    Major,
    Contraindicated,
}

/// One known interaction between two drugs, by generic name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub drug_a: String,
    pub drug_b: String,
    pub severity: InteractionSeverity,
    pub description: String,
    pub recommendation: String,
}

#[derive(Deserialize)]
struct InteractionsFile {
    #[serde(default)]
    interactions: Vec<InteractionRecord>,
}

/// Normalized key: lowercase, trimmed, order-independent.
fn pair_key(a: &str, b: &str) -> (String, String) {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Exact-match interaction lookup over normalized drug-name pairs.
#[derive(Debug, Clone, Default)]
pub struct InteractionIndex {
    by_pair: HashMap<(String, String), InteractionRecord>,
}

impl InteractionIndex {
    /// Load the interaction table from a JSON data file.
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
        let file: InteractionsFile =
            serde_json::from_str(&contents).map_err(CoreError::DataFileParse)?;
        Ok(Self::from_records(file.interactions))
    }

    pub fn from_records(records: Vec<InteractionRecord>) -> Self {
        let mut by_pair = HashMap::with_capacity(records.len());
        for record in records {
            by_pair.insert(pair_key(&record.drug_a, &record.drug_b), record);
        }
        Self { by_pair }
    }

    /// Look up the interaction between two drugs, in either order.
    pub fn check(&self, drug_a: &str, drug_b: &str) -> Option<&InteractionRecord> {
        self.by_pair.get(&pair_key(drug_a, drug_b))
    }

    /// Check every pair in a medication list.
    pub fn check_list<S: AsRef<str>>(&self, drugs: &[S]) -> Vec<InteractionRecord> {
        let mut found = Vec::new();
        for (i, a) in drugs.iter().enumerate() {
            for b in &drugs[i + 1..] {
                if let Some(record) = self.check(a.as_ref(), b.as_ref()) {
                    found.push(record.clone());
                }
            }
        }
        found
    }

    pub fn len(&self) -> usize {
        self.by_pair.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_pair.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(a: &str, b: &str, severity: InteractionSeverity) -> InteractionRecord {
        InteractionRecord {
            drug_a: a.into(),
            drug_b: b.into(),
            severity,
            description: format!("{a} interacts with {b}"),
            recommendation: "review therapy".into(),
        }
    }

    fn index() -> InteractionIndex {
        InteractionIndex::from_records(vec![
            record("warfarin", "aspirin", InteractionSeverity::Major),
            record("sildenafil", "nitroglycerin", InteractionSeverity::Contraindicated),
            record("clopidogrel", "omeprazole", InteractionSeverity::Moderate),
        ])
    }

    #[test]
    fn test_lookup_is_order_independent() {
        let index = index();
        assert!(index.check("warfarin", "aspirin").is_some());
        assert!(index.check("aspirin", "warfarin").is_some());
    }

    #[test]
    fn test_lookup_normalizes_case_and_whitespace() {
        let index = index();
        assert!(index.check(" Warfarin ", "ASPIRIN").is_some());
    }

    #[test]
    fn test_exact_match_only() {
        let index = index();
        // "warfarin sodium" must not match the "warfarin" record.
        assert!(index.check("warfarin sodium", "aspirin").is_none());
    }

    #[test]
    fn test_unknown_pair_is_none() {
        assert!(index().check("amoxicillin", "paracetamol").is_none());
    }

    #[test]
    fn test_check_list_covers_all_pairs() {
        let index = index();
        let found = index.check_list(&["warfarin", "aspirin", "sildenafil", "nitroglycerin"]);
        assert_eq!(found.len(), 2);
        assert!(found
            .iter()
            .any(|r| r.severity == InteractionSeverity::Contraindicated));
    }

    #[test]
    fn test_severity_ordering() {
        assert!(InteractionSeverity::Contraindicated > InteractionSeverity::Major);
        assert!(InteractionSeverity::Major > InteractionSeverity::Moderate);
        assert!(InteractionSeverity::Moderate > InteractionSeverity::Minor);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("interactions.json");
        let json = serde_json::json!({
            "interactions": [{
                "drug_a": "digoxin",
                "drug_b": "amiodarone",
                "severity": "major",
                "description": "amiodarone reduces digoxin clearance",
                "recommendation": "reduce digoxin dose and monitor levels"
            }]
        });
        std::fs::write(&path, json.to_string()).unwrap();

        let index = InteractionIndex::load(&path).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(
            index.check("amiodarone", "digoxin").unwrap().severity,
            InteractionSeverity::Major
        );
    }
}
