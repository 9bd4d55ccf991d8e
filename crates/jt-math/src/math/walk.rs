//! Odometer walk over a scope's table, tracking aligned offsets into other
//! tables whose scopes are subsets of it.

use super::scope::Scope;

/// Stride of each variable of `outer` inside `inner`'s table (0 when
/// `inner` does not contain the variable).
fn aligned_strides(outer: &Scope, inner: &Scope) -> Vec<usize> {
    let inner_vars: Vec<_> = inner.vars().zip(inner.strides()).collect();
    outer
        .vars()
        .map(|v| {
            inner_vars
                .iter()
                .find(|(iv, _)| *iv == v)
                .map_or(0, |(_, stride)| *stride)
        })
        .collect()
}

/// Visit every cell of a table over `outer` in table order.
///
/// `visit` receives the cell's flat index in `outer` and, for each of
/// `inners`, the flat index of the matching cell in a table over that
/// scope. Every inner scope must be a subset of `outer`.
pub(crate) fn walk<const N: usize>(
    outer: &Scope,
    inners: [&Scope; N],
    mut visit: impl FnMut(usize, [usize; N]),
) {
    let cards: Vec<usize> = outer.cardinalities().collect();
    let strides = inners.map(|inner| aligned_strides(outer, inner));
    let mut counter = vec![0usize; cards.len()];
    let mut offsets = [0usize; N];

    for cell in 0..outer.table_size() {
        visit(cell, offsets);
        for k in (0..cards.len()).rev() {
            counter[k] += 1;
            if counter[k] < cards[k] {
                for (offset, s) in offsets.iter_mut().zip(strides.iter()) {
                    *offset += s[k];
                }
                break;
            }
            counter[k] = 0;
            for (offset, s) in offsets.iter_mut().zip(strides.iter()) {
                *offset -= (cards[k] - 1) * s[k];
            }
        }
    }
}
