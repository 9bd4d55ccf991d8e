//! Model file types.
//!
//! A model file describes a discrete Bayesian network together with an
//! externally built clique tree and the ownership assignment (`alpha`)
//! mapping each variable to the clique that multiplies in its CPD.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::validate::ValidationError;

/// Complete model description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ModelFile {
    pub schema_version: String,

    #[serde(default)]
    pub description: Option<String>,

    pub variables: Vec<VariableSpec>,

    pub cpds: Vec<CpdSpec>,

    pub clique_tree: CliqueTreeSpec,

    /// Variable id → index of the clique that owns its CPD.
    pub alpha: BTreeMap<u32, usize>,
}

/// A discrete variable declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VariableSpec {
    pub id: u32,

    /// Display name; defaults to the numeric id.
    #[serde(default)]
    pub name: Option<String>,

    pub cardinality: usize,
}

impl VariableSpec {
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.id.to_string())
    }
}

/// Conditional distribution of `variable` given `parents`.
///
/// `values` is row-major over the scope `parents ∪ {variable}` sorted by
/// ascending variable id, with the highest id varying fastest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CpdSpec {
    pub variable: u32,

    #[serde(default)]
    pub parents: Vec<u32>,

    pub values: Vec<f64>,

    #[serde(rename = "_comment", default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl CpdSpec {
    /// Scope variable ids in table order.
    pub fn scope_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.parents.clone();
        ids.push(self.variable);
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

/// Clique tree supplied by an external tree-construction step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CliqueTreeSpec {
    /// Variable ids of each clique; clique `i` is `cliques[i]`.
    pub cliques: Vec<Vec<u32>>,

    /// Undirected edges, each listed once.
    pub edges: Vec<[usize; 2]>,
}

impl ModelFile {
    /// Load a model from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::parse_json(&content)
    }

    /// Parse a model from a JSON string.
    pub fn parse_json(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))
    }

    pub fn to_json(&self) -> Result<String, ValidationError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ValidationError::ParseError(format!("Serialize failed: {}", e)))
    }

    /// The built-in eight-variable student network.
    pub fn student() -> Self {
        // Embedded at compile time and covered by tests.
        Self::parse_json(STUDENT_MODEL_JSON).expect("Embedded student model JSON is invalid")
    }

    pub fn variable(&self, id: u32) -> Option<&VariableSpec> {
        self.variables.iter().find(|v| v.id == id)
    }

    /// Display names keyed by variable id.
    pub fn names(&self) -> BTreeMap<u32, String> {
        self.variables
            .iter()
            .map(|v| (v.id, v.display_name()))
            .collect()
    }

    /// JSON schema of the model file format.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(ModelFile)
    }
}

/// Embedded student network model.
pub const STUDENT_MODEL_JSON: &str = include_str!("schemas/student.model.json");
