//! Junction tree common types, IDs, and errors.
//!
//! This crate provides foundational types shared across the jt-* crates:
//! - The inference error taxonomy (domain vs structural failures)
//! - Run identifiers stamped on reports
//! - Schema versioning for JSON outputs
//! - Output format specifications

pub mod error;
pub mod id;
pub mod output;
pub mod schema;

pub use error::{Error, Result};
pub use id::RunId;
pub use output::OutputFormat;
pub use schema::SCHEMA_VERSION;
