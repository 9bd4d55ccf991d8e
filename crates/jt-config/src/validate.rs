//! Structural validation of model files.
//!
//! These checks catch malformed input before any factor is built. Numeric
//! properties of the CPDs (that each sums to one over its variable) and the
//! shape of the clique tree (connected, acyclic) are checked by the
//! inference core, which owns those invariants.

use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::model::ModelFile;

/// Model loading/validation failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("parse error: {0}")]
    ParseError(String),

    #[error("unsupported schema version: {0}")]
    SchemaVersion(String),

    #[error("{field}: {message}")]
    Invalid { field: String, message: String },
}

impl ValidationError {
    fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<ValidationError> for jt_common::Error {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::IoError(msg) => jt_common::Error::Config(msg),
            other => jt_common::Error::InvalidModel(other.to_string()),
        }
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

impl ModelFile {
    /// Validate structure: ids, scopes, table sizes, tree indices, alpha.
    pub fn validate(&self) -> ValidationResult<()> {
        if !jt_common::schema::is_compatible(&self.schema_version) {
            return Err(ValidationError::SchemaVersion(self.schema_version.clone()));
        }

        let cards = self.validate_variables()?;
        self.validate_cpds(&cards)?;
        self.validate_clique_tree(&cards)?;
        self.validate_alpha(&cards)?;
        Ok(())
    }

    fn validate_variables(&self) -> ValidationResult<BTreeMap<u32, usize>> {
        let mut cards = BTreeMap::new();
        for (i, var) in self.variables.iter().enumerate() {
            let field = format!("variables[{i}]");
            if var.cardinality == 0 {
                return Err(ValidationError::invalid(
                    field,
                    format!("variable {} has zero cardinality", var.id),
                ));
            }
            if cards.insert(var.id, var.cardinality).is_some() {
                return Err(ValidationError::invalid(
                    field,
                    format!("variable {} declared twice", var.id),
                ));
            }
        }
        Ok(cards)
    }

    fn validate_cpds(&self, cards: &BTreeMap<u32, usize>) -> ValidationResult<()> {
        let mut seen = BTreeSet::new();
        for (i, cpd) in self.cpds.iter().enumerate() {
            let field = format!("cpds[{i}]");
            if !cards.contains_key(&cpd.variable) {
                return Err(ValidationError::invalid(
                    field,
                    format!("undeclared variable {}", cpd.variable),
                ));
            }
            if !seen.insert(cpd.variable) {
                return Err(ValidationError::invalid(
                    field,
                    format!("second CPD for variable {}", cpd.variable),
                ));
            }
            let mut parents = BTreeSet::new();
            for &p in &cpd.parents {
                if p == cpd.variable {
                    return Err(ValidationError::invalid(
                        field,
                        format!("variable {p} listed as its own parent"),
                    ));
                }
                if !cards.contains_key(&p) {
                    return Err(ValidationError::invalid(
                        field,
                        format!("undeclared parent {p}"),
                    ));
                }
                if !parents.insert(p) {
                    return Err(ValidationError::invalid(
                        field,
                        format!("parent {p} listed twice"),
                    ));
                }
            }

            let expected: usize = cpd.scope_ids().iter().map(|id| cards[id]).product();
            if cpd.values.len() != expected {
                return Err(ValidationError::invalid(
                    field,
                    format!("expected {expected} values, got {}", cpd.values.len()),
                ));
            }
            if let Some(bad) = cpd.values.iter().find(|v| !v.is_finite() || **v < 0.0) {
                return Err(ValidationError::invalid(
                    field,
                    format!("value {bad} is not a finite non-negative number"),
                ));
            }
        }

        if let Some(missing) = cards.keys().find(|id| !seen.contains(*id)) {
            return Err(ValidationError::invalid(
                "cpds",
                format!("variable {missing} has no CPD"),
            ));
        }
        Ok(())
    }

    fn validate_clique_tree(&self, cards: &BTreeMap<u32, usize>) -> ValidationResult<()> {
        let n = self.clique_tree.cliques.len();
        for (i, clique) in self.clique_tree.cliques.iter().enumerate() {
            if let Some(id) = clique.iter().find(|id| !cards.contains_key(*id)) {
                return Err(ValidationError::invalid(
                    format!("clique_tree.cliques[{i}]"),
                    format!("undeclared variable {id}"),
                ));
            }
        }
        for (i, &[a, b]) in self.clique_tree.edges.iter().enumerate() {
            let field = format!("clique_tree.edges[{i}]");
            if a >= n || b >= n {
                return Err(ValidationError::invalid(
                    field,
                    format!("edge {a}-{b} names a clique outside 0..{n}"),
                ));
            }
            if a == b {
                return Err(ValidationError::invalid(
                    field,
                    format!("self-loop on clique {a}"),
                ));
            }
        }
        Ok(())
    }

    fn validate_alpha(&self, cards: &BTreeMap<u32, usize>) -> ValidationResult<()> {
        let n = self.clique_tree.cliques.len();
        for (&var, &clique) in &self.alpha {
            if !cards.contains_key(&var) {
                return Err(ValidationError::invalid(
                    "alpha",
                    format!("undeclared variable {var}"),
                ));
            }
            if clique >= n {
                return Err(ValidationError::invalid(
                    "alpha",
                    format!("variable {var} assigned to missing clique {clique}"),
                ));
            }
        }
        if let Some(missing) = cards.keys().find(|id| !self.alpha.contains_key(*id)) {
            return Err(ValidationError::invalid(
                "alpha",
                format!("variable {missing} is not assigned to a clique"),
            ));
        }
        Ok(())
    }
}
