//! Discrete Bayesian networks as a map from variable to its CPD factor.

use jt_common::{Error, Result};
use jt_math::{Factor, VarId};
use std::collections::BTreeMap;
use tracing::debug;

/// Tolerance for the "sums to one over the child" check on added CPDs.
pub const CPD_TOLERANCE: f64 = 1e-9;

/// A Bayesian network: one conditional distribution per variable.
///
/// Invariant: the factor stored for `v` has `v` in its scope and sums to
/// one over `v` for every setting of its other (parent) variables. Every
/// variable mentioned by any stored factor has a single cardinality.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Network {
    factors: BTreeMap<VarId, Factor>,
    cardinalities: BTreeMap<VarId, usize>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `factor` as the conditional distribution of `var`.
    ///
    /// Fails without modifying the network if the factor does not include
    /// `var`, if `var` was already added, if the factor is not a
    /// distribution over `var`, or if one of its variables was previously
    /// declared with another cardinality.
    pub fn add_variable(&mut self, var: VarId, factor: Factor) -> Result<()> {
        if !factor.scope().contains(var) {
            return Err(Error::domain(format!(
                "factor does not include the variable it conditions ({var})"
            )));
        }
        if self.factors.contains_key(&var) {
            return Err(Error::domain(format!("variable {var} added twice")));
        }
        for (v, card) in factor.scope().iter() {
            if let Some(&known) = self.cardinalities.get(&v) {
                if known != card {
                    return Err(Error::domain(format!(
                        "variable {v} has cardinality {known}, factor for {var} uses {card}"
                    )));
                }
            }
        }
        if !factor.is_conditional_on(var, CPD_TOLERANCE) {
            return Err(Error::domain(format!(
                "factor for {var} is not a conditional distribution over {var}"
            )));
        }

        debug!(var = %var, scope = %factor.scope(), "adding variable");
        for (v, card) in factor.scope().iter() {
            self.cardinalities.insert(v, card);
        }
        self.factors.insert(var, factor);
        Ok(())
    }

    /// The stored conditional distribution of `var`.
    pub fn factor(&self, var: VarId) -> Result<&Factor> {
        self.factors
            .get(&var)
            .ok_or_else(|| Error::domain(format!("unknown variable {var}")))
    }

    /// Variables with a stored factor, ascending.
    pub fn variables(&self) -> impl Iterator<Item = VarId> + '_ {
        self.factors.keys().copied()
    }

    /// Every variable mentioned in any stored factor, ascending. This is a
    /// superset of [`Network::variables`] when a parent has no CPD yet.
    pub fn mentioned_variables(&self) -> impl Iterator<Item = VarId> + '_ {
        self.cardinalities.keys().copied()
    }

    pub fn factors(&self) -> impl Iterator<Item = (VarId, &Factor)> + '_ {
        self.factors.iter().map(|(&v, f)| (v, f))
    }

    pub fn cardinality(&self, var: VarId) -> Option<usize> {
        self.cardinalities.get(&var).copied()
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }
}
