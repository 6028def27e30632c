//! Input validation utilities.
//!
//! Guardrails applied to caller-supplied identifiers before they reach the
//! lookup tables or the HIS. These reject garbage early; a well-formed but
//! unknown code is still a normal "not found" outcome, never an error here.

use crate::{CoreError, CoreResult};

const MAX_CODE_LEN: usize = 64;

/// Validate that a drug code is safe to use as a lookup key and to embed
/// in messages sent to the HIS.
///
/// - Rejects empty or whitespace-only strings
/// - Bounds the length to avoid pathological inputs
/// - Restricts characters to ASCII alphanumerics plus `-`, `_` and `.`
///
/// # Errors
///
/// Returns [`CoreError::InvalidInput`] if the code is invalid.
pub fn validate_drug_code(drug_code: &str) -> CoreResult<()> {
    if drug_code.trim().is_empty() {
        return Err(CoreError::InvalidInput("drug code cannot be empty".into()));
    }

    if drug_code.len() > MAX_CODE_LEN {
        return Err(CoreError::InvalidInput(format!(
            "drug code exceeds maximum length of {MAX_CODE_LEN} characters"
        )));
    }

    let ok = drug_code
        .bytes()
        .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'-' | b'_' | b'.'));

    if !ok {
        return Err(CoreError::InvalidInput(
            "drug code contains invalid characters (only alphanumeric, '-', '_', '.' allowed)"
                .into(),
        ));
    }

    Ok(())
}

/// Validate an order identifier with the same character rules as drug codes.
///
/// # Errors
///
/// Returns [`CoreError::InvalidInput`] if the identifier is invalid.
pub fn validate_order_id(order_id: &str) -> CoreResult<()> {
    validate_drug_code(order_id)
        .map_err(|_| CoreError::InvalidInput("order id is empty or malformed".into()))
}
