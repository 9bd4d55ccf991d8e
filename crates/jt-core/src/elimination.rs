//! Variable elimination.
//!
//! Computes the joint marginal over a requested set of variables by summing
//! out every other variable, one at a time, from the product of the factors
//! that mention it.

use jt_common::{Error, Result};
use jt_math::{Factor, Scope, VarId};
use std::collections::BTreeSet;
use tracing::{debug, trace};

use crate::network::Network;

impl Network {
    /// Marginal over exactly `remaining`.
    ///
    /// Variables of `order` that are not in `remaining` are eliminated first,
    /// in the order given (repeats are ignored). Any other variable still to
    /// be eliminated follows in ascending id order. The result is not
    /// normalized.
    pub fn var_elim(&self, remaining: &BTreeSet<VarId>, order: &[VarId]) -> Result<Factor> {
        let known: BTreeSet<VarId> = self.mentioned_variables().collect();
        if let Some(v) = remaining.iter().find(|v| !known.contains(v)) {
            return Err(Error::domain(format!("cannot query unknown variable {v}")));
        }
        if let Some(v) = order.iter().find(|v| !known.contains(v)) {
            return Err(Error::domain(format!(
                "elimination order names unknown variable {v}"
            )));
        }

        let mut schedule: Vec<VarId> = Vec::with_capacity(known.len());
        let mut scheduled = BTreeSet::new();
        for &v in order {
            if !remaining.contains(&v) && scheduled.insert(v) {
                schedule.push(v);
            }
        }
        for &v in &known {
            if !remaining.contains(&v) && scheduled.insert(v) {
                schedule.push(v);
            }
        }

        let mut working: Vec<Factor> = self.factors().map(|(_, f)| f.clone()).collect();
        for var in schedule {
            working = eliminate(working, var)?;
        }

        let mut result = Factor::ones(Scope::empty());
        for factor in &working {
            result = result.multiply(factor)?;
        }

        let got: BTreeSet<VarId> = result.scope().vars().collect();
        if &got != remaining {
            return Err(Error::structural(format!(
                "elimination left variables {:?}, expected {:?}",
                got, remaining
            )));
        }
        Ok(result)
    }

    /// Marginal distribution of a single variable, eliminating everything
    /// else in ascending id order.
    pub fn marginal(&self, var: VarId) -> Result<Factor> {
        self.var_elim(&BTreeSet::from([var]), &[])
    }
}

/// Multiply the factors that mention `var`, sum `var` out, and put the
/// result back in place of the consumed factors.
fn eliminate(working: Vec<Factor>, var: VarId) -> Result<Vec<Factor>> {
    let (touching, mut rest): (Vec<Factor>, Vec<Factor>) =
        working.into_iter().partition(|f| f.scope().contains(var));
    if touching.is_empty() {
        trace!(var = %var, "no factor mentions variable");
        return Ok(rest);
    }

    let consumed = touching.len();
    let mut product = Factor::ones(Scope::empty());
    for factor in &touching {
        product = product.multiply(factor)?;
    }
    let message = product.marginalize([var]);
    debug!(
        var = %var,
        consumed,
        product_cells = product.values().len(),
        scope = %message.scope(),
        "eliminated variable"
    );
    rest.push(message);
    Ok(rest)
}
