//! Criterion benchmarks for calibration and elimination on the student
//! network and on long chains.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use jt_core::{fixture, CliqueTree, Network};
use jt_math::{Factor, Scope, VarId};
use std::collections::{BTreeMap, BTreeSet};

/// Binary chain v0 → v1 → ... with one clique per edge.
fn chain(n: u32) -> (Network, CliqueTree, BTreeMap<VarId, usize>) {
    let mut network = Network::new();
    let first = Scope::single(VarId(0), 2).unwrap();
    network
        .add_variable(VarId(0), Factor::from_values(first, vec![0.3, 0.7]).unwrap())
        .unwrap();
    let mut cliques = Vec::new();
    let mut alpha = BTreeMap::from([(VarId(0), 0)]);
    for k in 1..n {
        let scope = Scope::from_pairs([(VarId(k - 1), 2), (VarId(k), 2)]).unwrap();
        let cpd = Factor::from_values(scope.clone(), vec![0.9, 0.1, 0.2, 0.8]).unwrap();
        network.add_variable(VarId(k), cpd).unwrap();
        alpha.insert(VarId(k), (k - 1) as usize);
        cliques.push(scope);
    }
    let mut tree = CliqueTree::new(cliques);
    for i in 1..tree.len() {
        tree.add_edge(i - 1, i);
    }
    (network, tree, alpha)
}

fn bench_student(c: &mut Criterion) {
    let model = fixture::student().unwrap();
    c.bench_function("calibrate_student", |b| {
        b.iter(|| black_box(model.network.calibrate(&model.tree, &model.alpha).unwrap()))
    });
    c.bench_function("var_elim_student_all_marginals", |b| {
        b.iter(|| {
            for var in model.network.variables() {
                black_box(model.network.var_elim(&BTreeSet::from([var]), &[]).unwrap());
            }
        })
    });
}

fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("calibrate_chain");
    for n in [16u32, 256, 4096] {
        let (network, tree, alpha) = chain(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| black_box(network.calibrate(&tree, &alpha).unwrap()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_student, bench_chain);
criterion_main!(benches);
