//! Exit codes for the jt-core CLI.
//!
//! Exit codes communicate the outcome without requiring output parsing.
//! They are stable across releases.

use jt_common::Error;

/// Exit codes for jt-core operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Clean = 0,

    /// `check` ran but at least one check exceeded its tolerance
    CheckFailed = 1,

    /// Model file missing, unreadable, or invalid
    ConfigError = 10,

    /// Domain, structural, or calibration error during inference
    InferenceError = 12,

    /// I/O error
    IoError = 13,

    /// Internal/unknown error
    InternalError = 99,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Clean)
    }

    /// Check if this exit code indicates an error requiring attention.
    pub fn is_error(self) -> bool {
        (self as i32) >= 10
    }

    /// Map an error to the code reported for it.
    pub fn from_error(err: &Error) -> Self {
        match err {
            Error::Domain(_) | Error::Structural(_) | Error::CalibrationMismatch(_) => {
                ExitCode::InferenceError
            }
            Error::Config(_) | Error::InvalidModel(_) => ExitCode::ConfigError,
            Error::Io(_) => ExitCode::IoError,
            Error::Json(_) => ExitCode::InternalError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}
