//! Property-based tests for calibration and elimination invariants.

use jt_core::{fixture, CliqueTree, InferenceModel, Network};
use jt_math::{Factor, Scope, VarId};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

/// Table sizes of the student CPDs in id order: C, D, I, T, G, S, L, J.
const STUDENT_TABLE_SIZES: [usize; 8] = [2, 4, 2, 4, 12, 4, 6, 8];

fn student_tables() -> impl Strategy<Value = Vec<Vec<f64>>> {
    STUDENT_TABLE_SIZES
        .iter()
        .map(|&n| prop::collection::vec(0.05f64..1.0, n))
        .collect::<Vec<_>>()
}

/// Student structure with CPD values replaced by `tables`, each rescaled
/// into a conditional distribution over its child.
fn random_student(tables: Vec<Vec<f64>>) -> InferenceModel {
    let mut model = fixture::student().unwrap();
    let mut network = Network::new();
    for ((var, cpd), values) in model.network.factors().zip(tables) {
        let raw = Factor::from_values(cpd.scope().clone(), values).unwrap();
        let conditional = raw.divide(&raw.marginalize([var])).unwrap();
        network.add_variable(var, conditional).unwrap();
    }
    model.network = network;
    model
}

/// Binary chain whose rows are `[p, 1 - p]`, one clique per edge.
fn chain(probs: &[f64]) -> (Network, CliqueTree, BTreeMap<VarId, usize>) {
    let mut network = Network::new();
    let first = Scope::single(VarId(0), 2).unwrap();
    network
        .add_variable(VarId(0), Factor::from_values(first, vec![0.5, 0.5]).unwrap())
        .unwrap();
    let mut cliques = Vec::new();
    let mut alpha = BTreeMap::from([(VarId(0), 0)]);
    for (k, pair) in probs.chunks(2).enumerate() {
        let child = VarId(k as u32 + 1);
        let scope = Scope::from_pairs([(VarId(k as u32), 2), (child, 2)]).unwrap();
        let values = vec![pair[0], 1.0 - pair[0], pair[1], 1.0 - pair[1]];
        network
            .add_variable(child, Factor::from_values(scope.clone(), values).unwrap())
            .unwrap();
        alpha.insert(child, k);
        cliques.push(scope);
    }
    let mut tree = CliqueTree::new(cliques);
    for i in 1..tree.len() {
        tree.add_edge(i - 1, i);
    }
    (network, tree, alpha)
}

fn edge_prob() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.0), Just(1.0), 0.0f64..=1.0]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn random_student_calibrates_to_elimination(tables in student_tables()) {
        let model = random_student(tables);
        let pot = model.network.calibrate(&model.tree, &model.alpha).unwrap();
        prop_assert!(pot.max_sepset_discrepancy().unwrap() < 1e-9);
        for var in model.network.variables() {
            let calibrated = pot.variable_marginal(var).unwrap();
            let eliminated = model.network.marginal(var).unwrap();
            prop_assert!(calibrated.max_abs_diff(&eliminated).unwrap() < 1e-9);
        }
    }

    #[test]
    fn elimination_order_is_irrelevant(
        tables in student_tables(),
        order in Just((0u32..8).collect::<Vec<_>>()).prop_shuffle(),
        target in 0u32..8,
    ) {
        let model = random_student(tables);
        let keep = BTreeSet::from([VarId(target)]);
        let order: Vec<VarId> = order.into_iter().map(VarId).collect();
        let hinted = model.network.var_elim(&keep, &order).unwrap();
        let plain = model.network.var_elim(&keep, &[]).unwrap();
        prop_assert!(hinted.max_abs_diff(&plain).unwrap() < 1e-12);
        prop_assert!((plain.total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn deterministic_chains_stay_finite_and_consistent(
        probs in prop::collection::vec(edge_prob(), 2..40usize)
            .prop_map(|mut v| { if v.len() % 2 == 1 { v.pop(); } v })
    ) {
        let (network, tree, alpha) = chain(&probs);
        let pot = network.calibrate(&tree, &alpha).unwrap();
        for beta in pot.betas() {
            prop_assert!(beta.values().iter().all(|x| x.is_finite()));
            prop_assert!((beta.total() - 1.0).abs() < 1e-9);
        }
        prop_assert!(pot.max_sepset_discrepancy().unwrap() < 1e-9);
        let last = VarId((probs.len() / 2) as u32);
        let calibrated = pot.variable_marginal(last).unwrap();
        let eliminated = network.marginal(last).unwrap();
        prop_assert!(calibrated.max_abs_diff(&eliminated).unwrap() < 1e-9);
    }
}
