//! Core math modules.

pub mod error;
pub mod factor;
pub mod scope;
mod walk;
