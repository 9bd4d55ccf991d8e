//! Error types for junction tree inference.

use thiserror::Error;

/// Result type alias for inference operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for inference.
#[derive(Error, Debug)]
pub enum Error {
    // Input-contract errors (10-19)
    /// Scope/cardinality mismatch, bad assignment, duplicate or missing variable.
    #[error("domain error: {0}")]
    Domain(String),

    /// Clique tree (or elimination result) does not have the required shape.
    #[error("structural error: {0}")]
    Structural(String),

    // Configuration errors (20-29)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid model file: {0}")]
    InvalidModel(String),

    // Verification errors (30-39)
    #[error("calibration check failed: {0}")]
    CalibrationMismatch(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    /// Used for detailed error reporting in JSON output.
    pub fn code(&self) -> u32 {
        match self {
            Error::Domain(_) => 10,
            Error::Structural(_) => 11,
            Error::Config(_) => 20,
            Error::InvalidModel(_) => 21,
            Error::CalibrationMismatch(_) => 30,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Shorthand for a domain error.
    pub fn domain(msg: impl Into<String>) -> Self {
        Error::Domain(msg.into())
    }

    /// Shorthand for a structural error.
    pub fn structural(msg: impl Into<String>) -> Self {
        Error::Structural(msg.into())
    }

    /// True for caller input-contract violations raised by the core.
    pub fn is_inference_error(&self) -> bool {
        matches!(
            self,
            Error::Domain(_) | Error::Structural(_) | Error::CalibrationMismatch(_)
        )
    }
}
