//! Criterion benchmarks for the factor algebra hot paths: product,
//! division by a sub-scope, and marginalization.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use jt_math::{Factor, Scope, VarId};

fn dense(vars: &[(u32, usize)]) -> Factor {
    let scope = Scope::from_pairs(vars.iter().map(|&(v, c)| (VarId(v), c))).unwrap();
    let n = scope.table_size();
    let values = (0..n).map(|i| 1.0 + (i % 7) as f64).collect();
    Factor::from_values(scope, values).unwrap()
}

fn bench_multiply(c: &mut Criterion) {
    let mut group = c.benchmark_group("factor_multiply");
    for card in [2usize, 4, 8] {
        let f = dense(&[(0, card), (1, card), (2, card)]);
        let g = dense(&[(2, card), (3, card), (4, card)]);
        group.bench_with_input(BenchmarkId::from_parameter(card), &card, |b, _| {
            b.iter(|| black_box(f.multiply(black_box(&g)).unwrap()))
        });
    }
    group.finish();
}

fn bench_divide(c: &mut Criterion) {
    let f = dense(&[(0, 6), (1, 6), (2, 6), (3, 6)]);
    let g = dense(&[(1, 6), (3, 6)]);
    c.bench_function("factor_divide_subset", |b| {
        b.iter(|| black_box(f.divide(black_box(&g)).unwrap()))
    });
}

fn bench_marginalize(c: &mut Criterion) {
    let f = dense(&[(0, 6), (1, 6), (2, 6), (3, 6)]);
    c.bench_function("factor_marginalize_two_of_four", |b| {
        b.iter(|| black_box(f.marginalize([VarId(0), VarId(2)])))
    });
}

criterion_group!(benches, bench_multiply, bench_divide, bench_marginalize);
criterion_main!(benches);
