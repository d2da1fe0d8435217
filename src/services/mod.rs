//! Lifecycle operations. Every function takes the acting user explicitly as an
//! [`Actor`](crate::auth::Actor) and returns [`AppError`](crate::error::AppError)
//! on failure; handlers only translate HTTP in and out.

pub mod accounts;
pub mod bids;
pub mod contracts;
pub mod invoices;
pub mod milestones;
pub mod notifications;
pub mod payments;
pub mod projects;

use crate::error::AppError;

/// Trimmed, non-empty text field or a validation error naming it.
pub(crate) fn required_text(value: Option<String>, field: &str) -> Result<String, AppError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("{field} is required"))),
    }
}

/// Positive, finite amount or a validation error naming it.
pub(crate) fn positive_amount(value: Option<f64>, field: &str) -> Result<f64, AppError> {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => Ok(v),
        Some(_) => Err(AppError::Validation(format!("{field} must be greater than zero"))),
        None => Err(AppError::Validation(format!("{field} is required"))),
    }
}
