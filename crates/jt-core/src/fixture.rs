//! Built-in demonstration networks.
//!
//! The student network has eight variables and a hand-built six-clique
//! tree. It is the reference input for the CLI and for the agreement tests
//! between calibration and variable elimination.

use jt_common::Result;
use jt_math::{Assignment, Factor, Scope, VarId};
use std::collections::BTreeMap;

use crate::calibrate::CliqueTree;
use crate::model::InferenceModel;
use crate::network::Network;

pub const C: VarId = VarId(0);
pub const D: VarId = VarId(1);
pub const I: VarId = VarId(2);
pub const T: VarId = VarId(3);
pub const G: VarId = VarId(4);
pub const S: VarId = VarId(5);
pub const L: VarId = VarId(6);
pub const J: VarId = VarId(7);

/// Factor over `scope` filled row by row. Each row lists one value per
/// scope variable, in ascending id order, followed by the cell value.
fn table(scope: &Scope, rows: &[(&[usize], f64)]) -> Result<Factor> {
    let mut factor = Factor::new(scope.clone(), 0.0);
    for (values, p) in rows {
        factor.set(&Assignment::from_values(scope, values)?, *p)?;
    }
    Ok(factor)
}

fn union(scopes: &[&Scope]) -> Result<Scope> {
    let mut out = Scope::empty();
    for s in scopes {
        out = out.union(s)?;
    }
    Ok(out)
}

/// The eight-variable student network with its clique tree and alpha.
pub fn student() -> Result<InferenceModel> {
    let cvar = Scope::single(C, 2)?;
    let dvar = Scope::single(D, 2)?;
    let ivar = Scope::single(I, 2)?;
    let tvar = Scope::single(T, 2)?;
    let gvar = Scope::single(G, 3)?;
    let svar = Scope::single(S, 2)?;
    let lvar = Scope::single(L, 2)?;
    let jvar = Scope::single(J, 2)?;

    let c = cvar.clone();
    let d = union(&[&cvar, &dvar])?;
    let i = ivar.clone();
    let t = union(&[&ivar, &tvar])?;
    let g = union(&[&dvar, &tvar, &gvar])?;
    let s = union(&[&tvar, &svar])?;
    let l = union(&[&gvar, &lvar])?;
    let j = union(&[&svar, &lvar, &jvar])?;

    let pc = table(&c, &[(&[0], 0.5), (&[1], 0.5)])?;
    let pd = table(
        &d,
        &[(&[0, 0], 0.4), (&[0, 1], 0.6), (&[1, 0], 0.8), (&[1, 1], 0.2)],
    )?;
    let pi = table(&i, &[(&[0], 0.6), (&[1], 0.4)])?;
    let pt = table(
        &t,
        &[(&[0, 0], 0.9), (&[0, 1], 0.1), (&[1, 0], 0.4), (&[1, 1], 0.6)],
    )?;
    let pg = table(
        &g,
        &[
            (&[0, 0, 0], 0.3),
            (&[0, 0, 1], 0.4),
            (&[0, 0, 2], 0.3),
            (&[1, 0, 0], 0.05),
            (&[1, 0, 1], 0.25),
            (&[1, 0, 2], 0.7),
            (&[0, 1, 0], 0.9),
            (&[0, 1, 1], 0.08),
            (&[0, 1, 2], 0.02),
            (&[1, 1, 0], 0.5),
            (&[1, 1, 1], 0.3),
            (&[1, 1, 2], 0.2),
        ],
    )?;
    let ps = table(
        &s,
        &[(&[0, 0], 0.95), (&[0, 1], 0.05), (&[1, 0], 0.2), (&[1, 1], 0.8)],
    )?;
    let pl = table(
        &l,
        &[
            (&[0, 0], 0.1),
            (&[0, 1], 0.9),
            (&[1, 0], 0.4),
            (&[1, 1], 0.6),
            (&[2, 0], 0.99),
            (&[2, 1], 0.01),
        ],
    )?;
    let pj = table(
        &j,
        &[
            (&[0, 0, 0], 0.9),
            (&[0, 0, 1], 0.1),
            (&[1, 0, 0], 0.4),
            (&[1, 0, 1], 0.6),
            (&[0, 1, 0], 0.3),
            (&[0, 1, 1], 0.7),
            (&[1, 1, 0], 0.1),
            (&[1, 1, 1], 0.9),
        ],
    )?;

    let mut network = Network::new();
    network.add_variable(C, pc)?;
    network.add_variable(D, pd)?;
    network.add_variable(I, pi)?;
    network.add_variable(T, pt)?;
    network.add_variable(G, pg)?;
    network.add_variable(S, ps)?;
    network.add_variable(L, pl)?;
    network.add_variable(J, pj)?;

    let tree = CliqueTree::new(vec![
        union(&[&cvar, &dvar])?,
        union(&[&gvar, &dvar, &tvar])?,
        union(&[&ivar, &tvar])?,
        union(&[&gvar, &tvar, &svar])?,
        union(&[&svar, &lvar, &gvar])?,
        union(&[&jvar, &lvar, &svar])?,
    ])
    .with_edge(0, 1)
    .with_edge(1, 3)
    .with_edge(2, 3)
    .with_edge(3, 4)
    .with_edge(4, 5);

    let alpha = BTreeMap::from([(C, 0), (D, 0), (I, 2), (T, 2), (G, 1), (S, 3), (L, 4), (J, 5)]);

    let names = [C, D, I, T, G, S, L, J]
        .into_iter()
        .zip(["C", "D", "I", "T", "G", "S", "L", "J"])
        .map(|(v, n)| (v, n.to_string()))
        .collect();

    Ok(InferenceModel {
        network,
        tree,
        alpha,
        names,
    })
}

/// Two-variable chain A → B with A = 0 and B = 1.
pub fn chain() -> Result<Network> {
    let a = Scope::single(VarId(0), 2)?;
    let ab = a.union(&Scope::single(VarId(1), 2)?)?;
    let mut network = Network::new();
    network.add_variable(VarId(0), Factor::from_values(a, vec![0.5, 0.5])?)?;
    network.add_variable(
        VarId(1),
        Factor::from_values(ab, vec![0.4, 0.6, 0.8, 0.2])?,
    )?;
    Ok(network)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn student_builds() {
        let model = student().unwrap();
        assert_eq!(model.network.len(), 8);
        assert_eq!(model.tree.len(), 6);
        assert_eq!(model.tree.adj.len(), 10);
        assert_eq!(model.network.cardinality(G), Some(3));
    }

    #[test]
    fn grade_table_layout() {
        let model = student().unwrap();
        let pg = model.network.factor(G).unwrap();
        // (D, T) = (1, 0) is the third row.
        assert_eq!(&pg.values()[6..9], &[0.05, 0.25, 0.7]);
    }

    #[test]
    fn every_cpd_is_normalized() {
        let model = student().unwrap();
        for (var, factor) in model.network.factors() {
            assert!(factor.is_conditional_on(var, 1e-12), "CPD of {var}");
        }
    }
}
