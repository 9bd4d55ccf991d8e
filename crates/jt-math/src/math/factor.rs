//! Dense discrete factors and their algebra.
//!
//! A [`Factor`] is a non-negative table over the Cartesian product of its
//! scope's cardinalities. Operations never mutate their inputs; each one
//! returns a freshly allocated factor.
//!
//! # Division by zero
//!
//! [`Factor::divide`] maps every cell whose divisor is zero to `0.0`. In
//! clique-tree calibration the divisor is a sepset belief, and a zero cell
//! there means the configuration is impossible; the numerator is then zero
//! as well, so `0/0 → 0` keeps the belief finite and correct.

use serde::Serialize;
use std::fmt;

use super::error::FactorError;
use super::scope::{Assignment, Scope, VarId};
use super::walk::walk;

/// Table-valued function over a finite set of discrete variables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Factor {
    scope: Scope,
    values: Vec<f64>,
}

impl Factor {
    /// Factor over `scope` with every cell set to `fill`.
    pub fn new(scope: Scope, fill: f64) -> Self {
        let values = vec![fill; scope.table_size()];
        Self { scope, values }
    }

    /// Constant-1 factor: the multiplicative identity over `scope`.
    pub fn ones(scope: Scope) -> Self {
        Self::new(scope, 1.0)
    }

    /// Factor with explicit cell values in table order (row-major by
    /// ascending variable id, highest id varying fastest).
    pub fn from_values(scope: Scope, values: Vec<f64>) -> Result<Self, FactorError> {
        let expected = scope.table_size();
        if values.len() != expected {
            return Err(FactorError::TableSizeMismatch {
                expected,
                actual: values.len(),
            });
        }
        Ok(Self { scope, values })
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Cell values in table order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Flat table index of an assignment covering exactly this scope.
    pub fn index_of(&self, assignment: &Assignment) -> Result<usize, FactorError> {
        if let Some((var, _)) = assignment.iter().find(|(v, _)| !self.scope.contains(*v)) {
            return Err(FactorError::ExtraVariable { var });
        }
        let mut index = 0;
        for ((var, card), stride) in self.scope.iter().zip(self.scope.strides()) {
            let value = assignment
                .get(var)
                .ok_or(FactorError::MissingVariable { var })?;
            if value >= card {
                return Err(FactorError::ValueOutOfRange {
                    var,
                    value,
                    cardinality: card,
                });
            }
            index += value * stride;
        }
        Ok(index)
    }

    pub fn get(&self, assignment: &Assignment) -> Result<f64, FactorError> {
        Ok(self.values[self.index_of(assignment)?])
    }

    pub fn set(&mut self, assignment: &Assignment, value: f64) -> Result<(), FactorError> {
        let index = self.index_of(assignment)?;
        self.values[index] = value;
        Ok(())
    }

    /// Pointwise product over the union of both scopes.
    pub fn multiply(&self, other: &Factor) -> Result<Factor, FactorError> {
        let scope = self.scope.union(&other.scope)?;
        let mut values = Vec::with_capacity(scope.table_size());
        walk(&scope, [&self.scope, &other.scope], |_, [a, b]| {
            values.push(self.values[a] * other.values[b]);
        });
        Ok(Factor { scope, values })
    }

    /// Pointwise quotient; `other`'s scope must be contained in this one.
    ///
    /// A zero divisor cell yields `0.0` (see the module docs).
    pub fn divide(&self, other: &Factor) -> Result<Factor, FactorError> {
        if let Some(var) = other.scope.vars().find(|v| !self.scope.contains(*v)) {
            return Err(FactorError::NotInScope { var });
        }
        // Rejects shared variables declared with different cardinalities.
        self.scope.union(&other.scope)?;

        let mut values = vec![0.0; self.values.len()];
        walk(&self.scope, [&other.scope], |cell, [b]| {
            let divisor = other.values[b];
            if divisor != 0.0 {
                values[cell] = self.values[cell] / divisor;
            }
        });
        Ok(Factor {
            scope: self.scope.clone(),
            values,
        })
    }

    /// Sum out `remove`. Ids outside the scope are ignored; removing every
    /// variable leaves a 0-dimensional factor holding the total mass.
    pub fn marginalize<I>(&self, remove: I) -> Factor
    where
        I: IntoIterator<Item = VarId>,
    {
        let kept = self.scope.without(remove);
        let mut values = vec![0.0; kept.table_size()];
        walk(&self.scope, [&kept], |cell, [k]| {
            values[k] += self.values[cell];
        });
        Factor {
            scope: kept,
            values,
        }
    }

    /// Marginalize down to the variables of `keep`, which must be a subset
    /// of this scope.
    pub fn project(&self, keep: &Scope) -> Result<Factor, FactorError> {
        if let Some(var) = keep.vars().find(|v| !self.scope.contains(*v)) {
            return Err(FactorError::NotInScope { var });
        }
        Ok(self.marginalize(self.scope.difference(keep).vars().collect::<Vec<_>>()))
    }

    /// Marginal over a single variable of the scope.
    pub fn marginal_of(&self, var: VarId) -> Result<Factor, FactorError> {
        let card = self
            .scope
            .cardinality(var)
            .ok_or(FactorError::NotInScope { var })?;
        self.project(&Scope::single(var, card)?)
    }

    /// Sum of all cells.
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Copy scaled to sum to one. An all-zero factor is returned unchanged.
    pub fn normalized(&self) -> Factor {
        let total = self.total();
        if total == 0.0 {
            return self.clone();
        }
        Factor {
            scope: self.scope.clone(),
            values: self.values.iter().map(|v| v / total).collect(),
        }
    }

    /// True when, for every setting of the other variables, the cells over
    /// `var` sum to one within `tol`.
    pub fn is_conditional_on(&self, var: VarId, tol: f64) -> bool {
        self.scope.contains(var)
            && self
                .marginalize([var])
                .values
                .iter()
                .all(|v| (v - 1.0).abs() <= tol)
    }

    /// Largest absolute cell difference between two factors over the same
    /// variables.
    pub fn max_abs_diff(&self, other: &Factor) -> Result<f64, FactorError> {
        if self.scope != other.scope {
            return Err(FactorError::ScopeMismatch(format!(
                "{} vs {}",
                self.scope, other.scope
            )));
        }
        Ok(self
            .values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max))
    }

    /// Every assignment over the scope, paired with its value, in table
    /// order.
    pub fn entries(&self) -> Entries<'_> {
        Entries {
            factor: self,
            counter: vec![0; self.scope.len()],
            cell: 0,
        }
    }
}

/// Iterator returned by [`Factor::entries`].
pub struct Entries<'a> {
    factor: &'a Factor,
    counter: Vec<usize>,
    cell: usize,
}

impl Iterator for Entries<'_> {
    type Item = (Assignment, f64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cell >= self.factor.values.len() {
            return None;
        }
        let mut assignment = Assignment::new();
        for (var, &value) in self.factor.scope.vars().zip(&self.counter) {
            assignment.set(var, value);
        }
        let value = self.factor.values[self.cell];

        self.cell += 1;
        let cards: Vec<usize> = self.factor.scope.cardinalities().collect();
        for k in (0..cards.len()).rev() {
            self.counter[k] += 1;
            if self.counter[k] < cards[k] {
                break;
            }
            self.counter[k] = 0;
        }
        Some((assignment, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.factor.values.len() - self.cell;
        (left, Some(left))
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for var in self.scope.vars() {
            write!(f, "{:>4}", format!("v{var}"))?;
        }
        writeln!(f, " | value")?;
        for (assignment, value) in self.entries() {
            for (_, x) in assignment.iter() {
                write!(f, "{x:>4}")?;
            }
            writeln!(f, " | {value:.6}")?;
        }
        Ok(())
    }
}
