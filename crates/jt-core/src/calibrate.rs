//! Clique-tree calibration by two-pass sum-product message passing.
//!
//! # Algorithm
//!
//! 1. Initialize every clique belief `beta[i]` to the constant-1 factor over
//!    the clique and multiply in the CPDs it owns (via `alpha`). Every sepset
//!    belief `mu[{i,j}]` starts as the constant-1 factor over the sepset.
//! 2. Upward pass: repeatedly pick the lowest-indexed clique with exactly one
//!    unprocessed edge and send a message across it. Each fired edge is
//!    pushed on a stack.
//! 3. Downward pass: pop the stack and send the reverse message over each
//!    edge.
//!
//! Sending a message from `i` to `j`:
//!
//! ```text
//! σ        = Σ_{C_i − S_ij} beta[i]
//! beta[j] ← beta[j] · σ / mu[{i,j}]
//! mu[{i,j}] ← σ
//! ```
//!
//! The traversal is an explicit worklist over clique indices with a
//! remaining-degree count per clique, so deep trees cannot overflow the
//! stack. A cycle leaves edges that never become leaf edges, and a forest
//! has too few edges; both are reported as structural errors.

use jt_common::{Error, Result};
use jt_math::{Factor, Scope, VarId};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

use crate::network::Network;

/// Canonical key of the undirected edge between two cliques.
pub fn edge_key(i: usize, j: usize) -> (usize, usize) {
    (i.min(j), i.max(j))
}

/// Clique tree supplied by an external tree-construction step.
///
/// Cliques are numbered by their position in `nodes`. `adj` holds directed
/// pairs; every undirected edge must appear in both directions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliqueTree {
    pub nodes: Vec<Scope>,
    pub adj: Vec<(usize, usize)>,
}

impl CliqueTree {
    pub fn new(nodes: Vec<Scope>) -> Self {
        Self {
            nodes,
            adj: Vec::new(),
        }
    }

    /// Add an undirected edge (both directions).
    pub fn add_edge(&mut self, i: usize, j: usize) {
        self.adj.push((i, j));
        self.adj.push((j, i));
    }

    /// Builder form of [`CliqueTree::add_edge`].
    pub fn with_edge(mut self, i: usize, j: usize) -> Self {
        self.add_edge(i, j);
        self
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Sorted neighbor lists, after checking the adjacency relation.
    fn neighbors(&self) -> Result<Vec<BTreeSet<usize>>> {
        let n = self.nodes.len();
        let mut neighbors = vec![BTreeSet::new(); n];
        for &(i, j) in &self.adj {
            if i >= n || j >= n {
                return Err(Error::structural(format!(
                    "edge {i}-{j} names a clique outside 0..{n}"
                )));
            }
            if i == j {
                return Err(Error::structural(format!("self-loop on clique {i}")));
            }
            neighbors[i].insert(j);
        }
        for (i, list) in neighbors.iter().enumerate() {
            if let Some(&j) = list.iter().find(|&&j| !neighbors[j].contains(&i)) {
                return Err(Error::structural(format!(
                    "edge {i}->{j} has no reverse direction"
                )));
            }
        }
        Ok(neighbors)
    }
}

/// Calibrated clique and sepset beliefs.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibratedPotentials {
    beta: Vec<Factor>,
    mu: BTreeMap<(usize, usize), Factor>,
}

impl CalibratedPotentials {
    /// Belief of clique `i`.
    pub fn beta(&self, i: usize) -> Option<&Factor> {
        self.beta.get(i)
    }

    /// All clique beliefs, indexed by clique.
    pub fn betas(&self) -> &[Factor] {
        &self.beta
    }

    /// Sepset belief of the edge between `i` and `j`, in either direction.
    pub fn mu(&self, i: usize, j: usize) -> Option<&Factor> {
        self.mu.get(&edge_key(i, j))
    }

    /// Sepset beliefs keyed by `(i, j)` with `i < j`, ascending.
    pub fn sepsets(&self) -> impl Iterator<Item = ((usize, usize), &Factor)> + '_ {
        self.mu.iter().map(|(&k, f)| (k, f))
    }

    /// Marginal of `var` from the lowest-indexed clique containing it.
    pub fn variable_marginal(&self, var: VarId) -> Result<Factor> {
        let belief = self
            .beta
            .iter()
            .find(|b| b.scope().contains(var))
            .ok_or_else(|| Error::domain(format!("no clique contains variable {var}")))?;
        Ok(belief.marginal_of(var)?)
    }

    /// Largest disagreement between a sepset belief and either adjacent
    /// clique belief marginalized onto the sepset.
    pub fn max_sepset_discrepancy(&self) -> Result<f64> {
        let mut worst: f64 = 0.0;
        for (&(i, j), mu) in &self.mu {
            for side in [i, j] {
                let projected = self.beta[side].project(mu.scope())?;
                worst = worst.max(projected.max_abs_diff(mu)?);
            }
        }
        Ok(worst)
    }

    /// Verify calibration within `tol`, returning the worst discrepancy.
    pub fn check_calibration(&self, tol: f64) -> Result<f64> {
        let worst = self.max_sepset_discrepancy()?;
        if worst > tol {
            return Err(Error::CalibrationMismatch(format!(
                "sepset discrepancy {worst:e} exceeds tolerance {tol:e}"
            )));
        }
        Ok(worst)
    }
}

impl Network {
    /// Calibrate `tree` with the CPDs assigned to cliques by `alpha`.
    ///
    /// Inputs are validated before any factor work, so a failure never
    /// yields partial results. Family preservation is checked per owned
    /// CPD; running intersection is assumed.
    pub fn calibrate(
        &self,
        tree: &CliqueTree,
        alpha: &BTreeMap<VarId, usize>,
    ) -> Result<CalibratedPotentials> {
        let n = tree.len();
        let neighbors = tree.neighbors()?;
        self.check_alpha(tree, alpha)?;
        info!(cliques = n, variables = self.len(), "calibrating clique tree");

        if n == 0 {
            return Ok(CalibratedPotentials {
                beta: Vec::new(),
                mu: BTreeMap::new(),
            });
        }

        let order = upward_order(&neighbors)?;
        let edges = order.len();
        if edges + 1 != n {
            return Err(Error::structural(format!(
                "clique tree is disconnected: {n} cliques but {edges} edges"
            )));
        }

        let mut beta: Vec<Factor> = tree.nodes.iter().cloned().map(Factor::ones).collect();
        for (&var, &clique) in alpha {
            let cpd = self.factor(var)?;
            beta[clique] = beta[clique].multiply(cpd)?;
        }

        let mut mu = BTreeMap::new();
        let mut sepsets = BTreeMap::new();
        for &(i, j) in &order {
            let sepset = tree.nodes[i].intersection(&tree.nodes[j]);
            mu.insert(edge_key(i, j), Factor::ones(sepset.clone()));
            sepsets.insert(edge_key(i, j), sepset);
        }

        for &(from, to) in &order {
            send_message(&mut beta, &mut mu, &sepsets, from, to)?;
        }
        for &(from, to) in order.iter().rev() {
            send_message(&mut beta, &mut mu, &sepsets, to, from)?;
        }

        info!(messages = order.len() * 2, "clique tree calibrated");
        Ok(CalibratedPotentials { beta, mu })
    }

    fn check_alpha(&self, tree: &CliqueTree, alpha: &BTreeMap<VarId, usize>) -> Result<()> {
        for (&var, &clique) in alpha {
            let cpd = self.factor(var)?;
            let node = tree.nodes.get(clique).ok_or_else(|| {
                Error::domain(format!(
                    "variable {var} assigned to missing clique {clique}"
                ))
            })?;
            if !cpd.scope().is_subset_of(node) {
                return Err(Error::domain(format!(
                    "clique {clique} {node} does not cover the family of variable {var} {}",
                    cpd.scope()
                )));
            }
        }
        if let Some(var) = self.variables().find(|v| !alpha.contains_key(v)) {
            return Err(Error::domain(format!(
                "variable {var} is not assigned to a clique"
            )));
        }
        Ok(())
    }
}

/// Leaf-peeling order of the upward pass as directed edges `(from, to)`.
fn upward_order(neighbors: &[BTreeSet<usize>]) -> Result<Vec<(usize, usize)>> {
    let mut degree: Vec<usize> = neighbors.iter().map(BTreeSet::len).collect();
    let mut processed: BTreeSet<(usize, usize)> = BTreeSet::new();
    let mut leaves: BTreeSet<usize> = (0..neighbors.len()).filter(|&i| degree[i] == 1).collect();
    let mut order = Vec::new();

    while let Some(i) = leaves.pop_first() {
        if degree[i] != 1 {
            continue;
        }
        let Some(&j) = neighbors[i]
            .iter()
            .find(|&&j| !processed.contains(&edge_key(i, j)))
        else {
            continue;
        };
        processed.insert(edge_key(i, j));
        degree[i] -= 1;
        degree[j] -= 1;
        if degree[j] == 1 {
            leaves.insert(j);
        }
        order.push((i, j));
    }

    let total: usize = neighbors.iter().map(BTreeSet::len).sum::<usize>() / 2;
    if processed.len() != total {
        let stuck: Vec<usize> = (0..neighbors.len()).filter(|&i| degree[i] > 0).collect();
        return Err(Error::structural(format!(
            "clique tree has a cycle through cliques {stuck:?}"
        )));
    }
    Ok(order)
}

fn send_message(
    beta: &mut [Factor],
    mu: &mut BTreeMap<(usize, usize), Factor>,
    sepsets: &BTreeMap<(usize, usize), Scope>,
    from: usize,
    to: usize,
) -> Result<()> {
    let key = edge_key(from, to);
    let sepset = &sepsets[&key];
    let sigma = beta[from].project(sepset)?;
    let updated = beta[to].multiply(&sigma)?.divide(&mu[&key])?;
    debug!(from, to, sepset = %sepset, mass = sigma.total(), "message");
    beta[to] = updated;
    mu.insert(key, sigma);
    Ok(())
}
