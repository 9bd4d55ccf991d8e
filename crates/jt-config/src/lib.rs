//! Junction tree model file loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for the JSON model file (network, clique tree, alpha)
//! - Model path resolution (CLI → env → XDG → built-in student network)
//! - Structural validation of a parsed model
//! - Model snapshots (source + content hash) for report provenance

pub mod model;
pub mod resolve;
pub mod snapshot;
pub mod validate;

pub use model::{CliqueTreeSpec, CpdSpec, ModelFile, VariableSpec};
pub use resolve::{resolve_model_path, ModelSource, MODEL_ENV_VAR};
pub use snapshot::ModelSnapshot;
pub use validate::{ValidationError, ValidationResult};

/// Schema version for model files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
