//! Schema versioning for JSON reports and model files.

use crate::error::{Error, Result};

/// Current schema version for all JSON outputs.
///
/// Follows semver: MAJOR.MINOR.PATCH. Only the MAJOR component decides
/// compatibility; MINOR additions are optional fields.
pub const SCHEMA_VERSION: &str = "1.0.0";

fn major_of(version: &str) -> Option<u32> {
    version.split('.').next().and_then(|s| s.parse::<u32>().ok())
}

/// Check if a schema version shares the current major version.
pub fn is_compatible(version: &str) -> bool {
    match (major_of(SCHEMA_VERSION), major_of(version)) {
        (Some(current), Some(other)) => current == other,
        _ => false,
    }
}

/// Like [`is_compatible`], but reports the mismatch as a config error.
pub fn ensure_compatible(version: &str) -> Result<()> {
    if is_compatible(version) {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "unsupported schema version {version} (expected {}.x)",
            SCHEMA_VERSION.split('.').next().unwrap_or("?")
        )))
    }
}
