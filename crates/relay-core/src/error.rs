//! Error Types

use thiserror::Error;

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, RelayError>;

/// Relay error kinds
///
/// The set is closed on purpose: the HTTP layer maps each variant to exactly
/// one transport status.
#[derive(Error, Debug)]
pub enum RelayError {
    /// Caller supplied a missing or malformed field
    #[error("{0}")]
    Validation(String),

    /// Remote inference call failed (transport, status, payload or timeout)
    #[error("Error calling inference endpoint: {0}")]
    Inference(String),

    /// Requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Anything else that escaped business logic
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Short machine-readable code for logs and envelopes
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Inference(_) => "INFERENCE_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Text recorded into conversation history when a turn fails
    pub fn history_message(&self) -> String {
        format!("I'm sorry, I encountered an error: {self}")
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<anyhow::Error> for RelayError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}
