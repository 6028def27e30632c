//! # PDS Core
//!
//! Core decision-support logic for the PDS pharmacy toolkit.
//!
//! This crate contains pure domain operations over immutable reference data:
//! - Formulary and renal-adjustment lookups loaded once at startup
//! - Cockcroft-Gault renal function estimation
//! - Order validation (the decision engine) and the submission gateway
//! - The HIS client interface with an in-memory mock
//! - Supporting calculators (dosing, interactions) and the example
//!   prescription workflow
//!
//! **No API concerns**: HTTP servers, OpenAPI schemas and CLI parsing belong
//! in `api-rest`, `api-shared` and `pds-cli`.

pub mod config;
pub mod crcl;
pub mod dosing;
pub mod error;
pub mod formulary;
pub mod his;
pub mod interactions;
pub mod order;
pub mod prescription;
pub mod renal;
pub mod results;
pub mod validation;
pub mod validator;
pub mod workflow;

pub use config::{resolve_data_dir, CoreConfig};
pub use crcl::{estimate_crcl, CrclEstimate, RenalCategory, Sex};
pub use error::{CoreError, CoreResult};
pub use formulary::{Formulary, FormularyItem};
pub use his::{HisClient, HisOrderResponse, HisPatient, MockHisClient};
pub use interactions::{InteractionIndex, InteractionRecord, InteractionSeverity};
pub use order::{Order, OrderDraft, OrderStatus};
pub use prescription::PrescriptionService;
pub use renal::RenalDosing;
pub use results::{
    OrderResult, RenalAdjustment, StopResult, SuggestedAdjustment, ValidationResult,
};
pub use validator::OrderValidator;
pub use workflow::{
    MedicationRequest, PrescriptionRequest, PrescriptionWorkflow, WorkflowOutcome,
};
