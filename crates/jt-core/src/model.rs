//! Inference inputs assembled from a model file or the built-in fixture.

use jt_common::{Error, Result};
use jt_config::ModelFile;
use jt_math::{Factor, Scope, VarId};
use std::collections::BTreeMap;

use crate::calibrate::CliqueTree;
use crate::network::Network;

/// Everything calibration and elimination need, plus display names.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceModel {
    pub network: Network,
    pub tree: CliqueTree,
    pub alpha: BTreeMap<VarId, usize>,
    pub names: BTreeMap<VarId, String>,
}

impl InferenceModel {
    /// Build the network, clique tree, and alpha from a validated model
    /// file. CPDs are added in file order.
    pub fn from_model_file(model: &ModelFile) -> Result<Self> {
        let cards: BTreeMap<u32, usize> = model
            .variables
            .iter()
            .map(|v| (v.id, v.cardinality))
            .collect();
        let scope_of = |ids: &[u32]| -> Result<Scope> {
            let mut scope = Scope::empty();
            for id in ids {
                let card = cards
                    .get(id)
                    .ok_or_else(|| Error::domain(format!("undeclared variable {id}")))?;
                scope.insert(VarId(*id), *card)?;
            }
            Ok(scope)
        };

        let mut network = Network::new();
        for cpd in &model.cpds {
            let scope = scope_of(cpd.scope_ids().as_slice())?;
            let factor = Factor::from_values(scope, cpd.values.clone())?;
            network.add_variable(VarId(cpd.variable), factor)?;
        }

        let mut tree = CliqueTree::new(
            model
                .clique_tree
                .cliques
                .iter()
                .map(|ids| scope_of(ids.as_slice()))
                .collect::<Result<Vec<_>>>()?,
        );
        for &[i, j] in &model.clique_tree.edges {
            tree.add_edge(i, j);
        }

        let alpha = model
            .alpha
            .iter()
            .map(|(&v, &c)| (VarId(v), c))
            .collect();
        let names = model
            .names()
            .into_iter()
            .map(|(id, name)| (VarId(id), name))
            .collect();

        Ok(Self {
            network,
            tree,
            alpha,
            names,
        })
    }

    /// Display name of a variable, falling back to its id.
    pub fn name(&self, var: VarId) -> String {
        self.names
            .get(&var)
            .cloned()
            .unwrap_or_else(|| var.to_string())
    }

    /// Resolve a variable given by name or numeric id.
    pub fn lookup(&self, token: &str) -> Result<VarId> {
        let token = token.trim();
        if let Some((&var, _)) = self.names.iter().find(|(_, name)| name.as_str() == token) {
            return Ok(var);
        }
        let var = token
            .parse::<u32>()
            .map(VarId)
            .map_err(|_| Error::domain(format!("unknown variable '{token}'")))?;
        if self.network.cardinality(var).is_none() {
            return Err(Error::domain(format!("unknown variable '{token}'")));
        }
        Ok(var)
    }
}
