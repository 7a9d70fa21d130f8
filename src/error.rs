//! Error types for the advisor core
//!
//! Every calculation in this crate is a pure function, so none of these
//! errors is transient. Callers report them; nothing retries.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdvisorError {
    /// A soil reading field is missing, non-finite, negative, or out of domain.
    #[error("invalid soil reading: {field} {reason}")]
    InvalidReading { field: &'static str, reason: String },

    /// A weather record field is non-finite or out of range.
    #[error("invalid weather record: {field} {reason}")]
    InvalidConditions { field: &'static str, reason: String },

    /// Crop name not present in the reference table. No default is substituted.
    #[error("unknown crop: {0}")]
    UnknownCrop(String),

    /// Static-data defect in the fertilizer table: content fraction outside (0, 1].
    #[error("invalid content fraction {fraction} for fertilizer product '{product}'")]
    InvalidContentFraction { product: String, fraction: f64 },

    /// Reference table failed validation for a reason other than a content fraction.
    #[error("invalid reference data: {0}")]
    InvalidReference(String),

    /// No trained classifier is loaded.
    #[error("classifier unavailable: {0}")]
    ClassifierUnavailable(String),

    /// Trained artifact or training data is malformed.
    #[error("model error: {0}")]
    Model(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl AdvisorError {
    pub fn invalid_reading(field: &'static str, reason: impl Into<String>) -> Self {
        AdvisorError::InvalidReading { field, reason: reason.into() }
    }

    pub fn invalid_conditions(field: &'static str, reason: impl Into<String>) -> Self {
        AdvisorError::InvalidConditions { field, reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, AdvisorError>;
