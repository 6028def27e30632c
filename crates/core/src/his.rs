//! Hospital information system (HIS) client interface and its mock.
//!
//! The HIS is the system of record for order placement. The engine only
//! depends on the [`HisClient`] trait; deployments swap in a real transport
//! while development and tests use [`MockHisClient`]. Failures reported by
//! the HIS are propagated to callers unmodified and never retried here.

use crate::crcl::Sex;
use crate::order::{Order, OrderDraft, OrderStatus};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// Patient demographics as returned by the HIS.
#[derive(Debug, Clone, PartialEq)]
pub struct HisPatient {
    pub patient_id: String,
    pub name: String,
    pub age_years: u32,
    pub weight_kg: f64,
    pub sex: Sex,
    /// mg/dL.
    pub serum_creatinine: f64,
    pub admission_date: NaiveDate,
}

/// Raw HIS response to an order mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct HisOrderResponse {
    pub success: bool,
    pub order_id: Option<String>,
    pub message: String,
    pub error_code: Option<String>,
}

impl HisOrderResponse {
    fn ok(order_id: String, message: &str) -> Self {
        Self {
            success: true,
            order_id: Some(order_id),
            message: message.to_string(),
            error_code: None,
        }
    }

    fn fail(message: String, error_code: &str) -> Self {
        Self {
            success: false,
            order_id: None,
            message,
            error_code: Some(error_code.to_string()),
        }
    }
}

/// Order-related operations of the hospital information system.
#[async_trait]
pub trait HisClient: Send + Sync {
    async fn get_patient(&self, patient_id: &str) -> Option<HisPatient>;

    async fn create_order(&self, draft: &OrderDraft) -> HisOrderResponse;

    async fn discontinue_order(&self, order_id: &str, reason: &str) -> HisOrderResponse;

    async fn get_order(&self, order_id: &str) -> Option<Order>;

    async fn active_orders(&self, patient_id: &str) -> Vec<Order>;
}

/// In-memory HIS used for development and tests.
///
/// Holds three seeded patients and stores created orders in memory. No
/// external system is touched.
pub struct MockHisClient {
    patients: Mutex<HashMap<String, HisPatient>>,
    orders: Mutex<HashMap<String, Order>>,
}

impl MockHisClient {
    pub fn new() -> Self {
        let mut patients = HashMap::new();
        for patient in [
            HisPatient {
                patient_id: "P001".into(),
                name: "Walter Ng".into(),
                age_years: 75,
                weight_kg: 60.0,
                sex: Sex::Male,
                serum_creatinine: 1.8,
                admission_date: NaiveDate::from_ymd_opt(2026, 1, 5).expect("valid date"),
            },
            HisPatient {
                patient_id: "P002".into(),
                name: "Amelia Santos".into(),
                age_years: 45,
                weight_kg: 55.0,
                sex: Sex::Female,
                serum_creatinine: 0.9,
                admission_date: NaiveDate::from_ymd_opt(2026, 1, 7).expect("valid date"),
            },
            HisPatient {
                patient_id: "P003".into(),
                name: "George Hale".into(),
                age_years: 85,
                weight_kg: 50.0,
                sex: Sex::Male,
                serum_creatinine: 2.5,
                admission_date: NaiveDate::from_ymd_opt(2026, 1, 3).expect("valid date"),
            },
        ] {
            patients.insert(patient.patient_id.clone(), patient);
        }

        Self {
            patients: Mutex::new(patients),
            orders: Mutex::new(HashMap::new()),
        }
    }

    /// Register an extra patient. Intended for tests.
    pub fn add_patient(&self, patient: HisPatient) {
        self.patients
            .lock()
            .expect("patient table lock")
            .insert(patient.patient_id.clone(), patient);
    }

    /// Drop every stored order. Intended for tests.
    pub fn clear_orders(&self) {
        self.orders.lock().expect("order table lock").clear();
    }

    fn new_order_id() -> String {
        let date = Utc::now().format("%Y%m%d");
        let suffix = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
        format!("ORD-{date}-{suffix}")
    }
}

impl Default for MockHisClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HisClient for MockHisClient {
    async fn get_patient(&self, patient_id: &str) -> Option<HisPatient> {
        self.patients
            .lock()
            .expect("patient table lock")
            .get(patient_id)
            .cloned()
    }

    async fn create_order(&self, draft: &OrderDraft) -> HisOrderResponse {
        if self.get_patient(&draft.patient_id).await.is_none() {
            return HisOrderResponse::fail(
                format!("patient {} not found", draft.patient_id),
                "PATIENT_NOT_FOUND",
            );
        }

        let order_id = Self::new_order_id();
        let order = Order {
            order_id: order_id.clone(),
            patient_id: draft.patient_id.clone(),
            drug_code: draft.drug_code.clone(),
            drug_name: draft.drug_code.clone(),
            dose: draft.dose,
            dose_unit: draft.dose_unit.clone(),
            route: draft.route.clone(),
            frequency: draft.frequency.clone(),
            duration_days: draft.duration_days,
            physician_id: draft.physician_id.clone(),
            status: OrderStatus::Active,
            created_at: Utc::now(),
            discontinued_at: None,
            discontinue_reason: None,
            notes: draft.notes.clone(),
        };

        self.orders
            .lock()
            .expect("order table lock")
            .insert(order_id.clone(), order);

        HisOrderResponse::ok(order_id, "order created")
    }

    async fn discontinue_order(&self, order_id: &str, reason: &str) -> HisOrderResponse {
        let mut orders = self.orders.lock().expect("order table lock");

        let Some(order) = orders.get_mut(order_id) else {
            return HisOrderResponse::fail(
                format!("order {order_id} not found"),
                "ORDER_NOT_FOUND",
            );
        };

        if order.status == OrderStatus::Discontinued {
            return HisOrderResponse::fail(
                "order is already discontinued".to_string(),
                "ALREADY_DISCONTINUED",
            );
        }

        order.discontinue(reason);
        HisOrderResponse::ok(order_id.to_string(), "order discontinued")
    }

    async fn get_order(&self, order_id: &str) -> Option<Order> {
        self.orders
            .lock()
            .expect("order table lock")
            .get(order_id)
            .cloned()
    }

    async fn active_orders(&self, patient_id: &str) -> Vec<Order> {
        self.orders
            .lock()
            .expect("order table lock")
            .values()
            .filter(|o| o.patient_id == patient_id && o.is_active())
            .cloned()
            .collect()
    }
}
