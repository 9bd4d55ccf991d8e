//! Variable identifiers, scopes, and assignments.
//!
//! A [`Scope`] maps each variable to its cardinality and always iterates in
//! ascending variable id. That order fixes the table layout of every
//! factor: row-major, with the highest variable id varying fastest.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::error::FactorError;

/// Identifier of a discrete network variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VarId(pub u32);

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for VarId {
    fn from(id: u32) -> Self {
        VarId(id)
    }
}

/// Set of variables together with their cardinalities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scope {
    vars: BTreeMap<VarId, usize>,
}

impl Scope {
    /// The empty scope (a factor over it holds a single number).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Scope over a single variable.
    pub fn single(var: VarId, cardinality: usize) -> Result<Self, FactorError> {
        let mut scope = Self::empty();
        scope.insert(var, cardinality)?;
        Ok(scope)
    }

    /// Build a scope from `(variable, cardinality)` pairs.
    ///
    /// Repeating a variable is allowed when the cardinality agrees.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, FactorError>
    where
        I: IntoIterator<Item = (VarId, usize)>,
    {
        let mut scope = Self::empty();
        for (var, cardinality) in pairs {
            scope.insert(var, cardinality)?;
        }
        Ok(scope)
    }

    /// Add a variable. Re-inserting with a different cardinality fails.
    pub fn insert(&mut self, var: VarId, cardinality: usize) -> Result<(), FactorError> {
        if cardinality == 0 {
            return Err(FactorError::ZeroCardinality { var });
        }
        match self.vars.get(&var) {
            Some(&existing) if existing != cardinality => Err(FactorError::CardinalityMismatch {
                var,
                left: existing,
                right: cardinality,
            }),
            _ => {
                self.vars.insert(var, cardinality);
                Ok(())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn contains(&self, var: VarId) -> bool {
        self.vars.contains_key(&var)
    }

    pub fn cardinality(&self, var: VarId) -> Option<usize> {
        self.vars.get(&var).copied()
    }

    /// Variables in ascending id order.
    pub fn vars(&self) -> impl Iterator<Item = VarId> + '_ {
        self.vars.keys().copied()
    }

    /// Cardinalities in ascending variable id order.
    pub fn cardinalities(&self) -> impl Iterator<Item = usize> + '_ {
        self.vars.values().copied()
    }

    /// `(variable, cardinality)` pairs in ascending variable id order.
    pub fn iter(&self) -> impl Iterator<Item = (VarId, usize)> + '_ {
        self.vars.iter().map(|(&v, &c)| (v, c))
    }

    /// Number of cells in a table over this scope.
    pub fn table_size(&self) -> usize {
        self.vars.values().product()
    }

    /// Row-major strides, aligned with [`Scope::vars`].
    pub fn strides(&self) -> Vec<usize> {
        let mut strides = vec![0; self.vars.len()];
        let mut acc = 1;
        for (slot, card) in strides.iter_mut().rev().zip(self.vars.values().rev()) {
            *slot = acc;
            acc *= card;
        }
        strides
    }

    /// Union of two scopes; shared variables must agree on cardinality.
    pub fn union(&self, other: &Scope) -> Result<Scope, FactorError> {
        let mut out = self.clone();
        for (var, card) in other.iter() {
            out.insert(var, card)?;
        }
        Ok(out)
    }

    /// Variables present in both scopes (cardinalities taken from `self`).
    pub fn intersection(&self, other: &Scope) -> Scope {
        Scope {
            vars: self
                .vars
                .iter()
                .filter(|(v, _)| other.vars.contains_key(v))
                .map(|(&v, &c)| (v, c))
                .collect(),
        }
    }

    /// Variables of `self` that are not in `other`.
    pub fn difference(&self, other: &Scope) -> Scope {
        self.without(other.vars())
    }

    /// Copy of the scope with the given variables dropped. Unknown ids are
    /// ignored.
    pub fn without<I>(&self, remove: I) -> Scope
    where
        I: IntoIterator<Item = VarId>,
    {
        let mut vars = self.vars.clone();
        for var in remove {
            vars.remove(&var);
        }
        Scope { vars }
    }

    /// Set inclusion on variables, ignoring cardinalities.
    pub fn is_subset_of(&self, other: &Scope) -> bool {
        self.vars.keys().all(|v| other.vars.contains_key(v))
    }

    /// True when both scopes name the same variables.
    pub fn same_vars(&self, other: &Scope) -> bool {
        self.len() == other.len() && self.is_subset_of(other)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (var, card)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{var}:{card}")?;
        }
        write!(f, "}}")
    }
}

/// Concrete value index for each of a set of variables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Assignment {
    values: BTreeMap<VarId, usize>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `values` to the variables of `scope` in ascending id order.
    ///
    /// `Assignment::from_values(&s, &[0, 1])` sets the lower id to 0 and the
    /// higher id to 1.
    pub fn from_values(scope: &Scope, values: &[usize]) -> Result<Self, FactorError> {
        if values.len() != scope.len() {
            return Err(FactorError::TableSizeMismatch {
                expected: scope.len(),
                actual: values.len(),
            });
        }
        let mut out = Self::new();
        for ((var, card), &value) in scope.iter().zip(values) {
            if value >= card {
                return Err(FactorError::ValueOutOfRange {
                    var,
                    value,
                    cardinality: card,
                });
            }
            out.values.insert(var, value);
        }
        Ok(out)
    }

    /// Set (or overwrite) the value of one variable.
    pub fn set(&mut self, var: VarId, value: usize) {
        self.values.insert(var, value);
    }

    /// Builder form of [`Assignment::set`].
    pub fn with(mut self, var: VarId, value: usize) -> Self {
        self.set(var, value);
        self
    }

    pub fn get(&self, var: VarId) -> Option<usize> {
        self.values.get(&var).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VarId, usize)> + '_ {
        self.values.iter().map(|(&v, &x)| (v, x))
    }

    /// The part of this assignment that falls inside `scope`.
    pub fn restrict(&self, scope: &Scope) -> Assignment {
        Assignment {
            values: self
                .values
                .iter()
                .filter(|(v, _)| scope.contains(**v))
                .map(|(&v, &x)| (v, x))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(pairs: &[(u32, usize)]) -> Scope {
        Scope::from_pairs(pairs.iter().map(|&(v, c)| (VarId(v), c))).unwrap()
    }

    #[test]
    fn iterates_in_ascending_id_order() {
        let s = scope(&[(4, 3), (1, 2), (3, 2)]);
        let vars: Vec<u32> = s.vars().map(|v| v.0).collect();
        assert_eq!(vars, vec![1, 3, 4]);
        assert_eq!(s.table_size(), 12);
    }

    #[test]
    fn strides_are_row_major_last_fastest() {
        let s = scope(&[(1, 2), (3, 2), (4, 3)]);
        assert_eq!(s.strides(), vec![6, 3, 1]);
        assert!(Scope::empty().strides().is_empty());
        assert_eq!(Scope::empty().table_size(), 1);
    }

    #[test]
    fn union_rejects_cardinality_conflict() {
        let a = scope(&[(0, 2), (1, 2)]);
        let b = scope(&[(1, 3)]);
        assert_eq!(
            a.union(&b),
            Err(FactorError::CardinalityMismatch {
                var: VarId(1),
                left: 2,
                right: 3
            })
        );
    }

    #[test]
    fn set_operations() {
        let a = scope(&[(0, 2), (1, 2), (2, 3)]);
        let b = scope(&[(1, 2), (2, 3), (5, 2)]);
        assert_eq!(a.intersection(&b), scope(&[(1, 2), (2, 3)]));
        assert_eq!(a.difference(&b), scope(&[(0, 2)]));
        assert_eq!(a.union(&b).unwrap().len(), 4);
        assert!(a.intersection(&b).is_subset_of(&a));
        assert!(!a.is_subset_of(&b));
        assert_eq!(a.without([VarId(9)]), a);
    }

    #[test]
    fn zero_cardinality_rejected() {
        assert_eq!(
            Scope::single(VarId(7), 0),
            Err(FactorError::ZeroCardinality { var: VarId(7) })
        );
    }

    #[test]
    fn assignment_from_values_follows_scope_order() {
        let s = scope(&[(2, 2), (0, 3)]);
        let a = Assignment::from_values(&s, &[2, 1]).unwrap();
        assert_eq!(a.get(VarId(0)), Some(2));
        assert_eq!(a.get(VarId(2)), Some(1));
        assert!(Assignment::from_values(&s, &[3, 0]).is_err());
        assert!(Assignment::from_values(&s, &[0]).is_err());
    }

    #[test]
    fn restrict_keeps_only_scope_vars() {
        let a = Assignment::new().with(VarId(0), 1).with(VarId(4), 2);
        let r = a.restrict(&scope(&[(4, 3)]));
        assert_eq!(r.len(), 1);
        assert_eq!(r.get(VarId(4)), Some(2));
    }

    #[test]
    fn scope_serializes_as_object() {
        let s = scope(&[(1, 2), (0, 3)]);
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, r#"{"0":3,"1":2}"#);
        let back: Scope = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
