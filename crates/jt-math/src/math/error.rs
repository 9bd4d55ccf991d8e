//! Errors raised by the factor algebra.

use thiserror::Error;

use super::scope::VarId;

/// Factor algebra failures. All of them are caller input-contract
/// violations and surface as domain errors once they leave this crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FactorError {
    #[error("variable {var} declared with cardinality {left} and {right}")]
    CardinalityMismatch { var: VarId, left: usize, right: usize },

    #[error("variable {var} must have a positive cardinality")]
    ZeroCardinality { var: VarId },

    #[error("assignment is missing variable {var}")]
    MissingVariable { var: VarId },

    #[error("assignment has variable {var} outside the factor scope")]
    ExtraVariable { var: VarId },

    #[error("value {value} out of range for variable {var} (cardinality {cardinality})")]
    ValueOutOfRange {
        var: VarId,
        value: usize,
        cardinality: usize,
    },

    #[error("expected {expected} values for the scope, got {actual}")]
    TableSizeMismatch { expected: usize, actual: usize },

    #[error("variable {var} is not in the factor scope")]
    NotInScope { var: VarId },

    #[error("scopes differ: {0}")]
    ScopeMismatch(String),
}

impl From<FactorError> for jt_common::Error {
    fn from(err: FactorError) -> Self {
        jt_common::Error::Domain(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_to_domain_error() {
        let err: jt_common::Error = FactorError::ZeroCardinality { var: VarId(3) }.into();
        assert_eq!(err.code(), 10);
        assert!(err.to_string().contains("variable 3"));
    }
}
