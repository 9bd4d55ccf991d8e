//! Model snapshots for report provenance.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::model::ModelFile;
use crate::resolve::ModelSource;
use crate::validate::{ValidationError, ValidationResult};

/// A loaded, validated model plus where it came from.
#[derive(Debug, Clone, Serialize)]
pub struct ModelSnapshot {
    pub source: ModelSource,
    /// SHA-256 of the canonical (re-serialized) model JSON.
    pub sha256: String,
    pub schema_version: String,
    pub loaded_at: DateTime<Utc>,
    #[serde(skip)]
    pub model: ModelFile,
}

impl ModelSnapshot {
    /// Load and validate the model named by `source`.
    pub fn load(source: ModelSource) -> ValidationResult<Self> {
        let model = match source.path() {
            Some(path) => ModelFile::from_file(path)?,
            None => ModelFile::student(),
        };
        model.validate()?;
        Self::from_model(source, model)
    }

    pub fn from_model(source: ModelSource, model: ModelFile) -> ValidationResult<Self> {
        let canonical = serde_json::to_vec(&model)
            .map_err(|e| ValidationError::ParseError(format!("Serialize failed: {}", e)))?;
        let sha256 = hex::encode(Sha256::digest(&canonical));
        Ok(Self {
            source,
            sha256,
            schema_version: model.schema_version.clone(),
            loaded_at: Utc::now(),
            model,
        })
    }
}
