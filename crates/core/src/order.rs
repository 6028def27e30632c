//! Medication order entity and draft.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a medication order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Active,
    Completed,
    Discontinued,
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Active => "active",
            OrderStatus::Completed => "completed",
            OrderStatus::Discontinued => "discontinued",
            OrderStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// A proposed order as submitted by a prescriber, before the HIS has
/// accepted it and assigned an order id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDraft {
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
}

/// A medication order as recorded by the HIS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub patient_id: String,
    pub drug_code: String,
    pub drug_name: String,
    pub dose: f64,
    pub dose_unit: String,
    pub route: String,
    pub frequency: String,
    pub duration_days: u32,
    pub physician_id: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub discontinued_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub discontinue_reason: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Order {
    pub fn discontinue(&mut self, reason: &str) {
        self.status = OrderStatus::Discontinued;
        self.discontinued_at = Some(Utc::now());
        self.discontinue_reason = Some(reason.to_string());
    }

    pub fn activate(&mut self) {
        self.status = OrderStatus::Active;
    }

    pub fn complete(&mut self) {
        self.status = OrderStatus::Completed;
    }

    pub fn is_active(&self) -> bool {
        self.status == OrderStatus::Active
    }

    pub fn dose_display(&self) -> String {
        format!("{} {}", self.dose, self.dose_unit)
    }

    /// Full prescription line, e.g. "Gentamicin 80mg/2mL 80 mg IV Q8H".
    pub fn prescription_display(&self) -> String {
        format!(
            "{} {} {} {}",
            self.drug_name,
            self.dose_display(),
            self.route,
            self.frequency
        )
    }
}
