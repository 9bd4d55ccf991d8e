//! Self-checks comparing calibrated beliefs against variable elimination.

use jt_common::Result;
use std::collections::BTreeSet;
use tracing::debug;

use crate::model::InferenceModel;
use crate::report::{CheckResult, CheckStatus};

/// Default tolerance for every check.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

fn result(check: String, value: f64, tolerance: f64) -> CheckResult {
    let status = if value <= tolerance {
        CheckStatus::Ok
    } else {
        CheckStatus::Failed
    };
    debug!(check = %check, value, ?status, "check finished");
    CheckResult {
        check,
        status,
        value,
    }
}

/// Calibrate the model and run every check.
///
/// Structural or domain failures during calibration or elimination are
/// returned as errors, not as failed checks.
pub fn run_checks(model: &InferenceModel, tolerance: f64) -> Result<Vec<CheckResult>> {
    let potentials = model.network.calibrate(&model.tree, &model.alpha)?;
    let mut checks = vec![result(
        "sepset_consistency".to_string(),
        potentials.max_sepset_discrepancy()?,
        tolerance,
    )];

    let z = model.network.var_elim(&BTreeSet::new(), &[])?.values()[0];
    let mass = potentials
        .betas()
        .iter()
        .map(|b| (b.total() - z).abs())
        .fold(0.0, f64::max);
    checks.push(result("belief_mass".to_string(), mass, tolerance));

    for var in model.network.mentioned_variables() {
        let calibrated = potentials.variable_marginal(var)?;
        let eliminated = model.network.marginal(var)?;
        checks.push(result(
            format!("marginal_agreement:{}", model.name(var)),
            calibrated.max_abs_diff(&eliminated)?,
            tolerance,
        ));
    }
    Ok(checks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture;

    #[test]
    fn student_passes_every_check() {
        let model = fixture::student().unwrap();
        let checks = run_checks(&model, DEFAULT_TOLERANCE).unwrap();
        assert_eq!(checks.len(), 2 + 8);
        assert!(checks.iter().all(|c| c.status == CheckStatus::Ok), "{checks:?}");
        assert_eq!(checks[2].check, "marginal_agreement:C");
    }

    #[test]
    fn negative_tolerance_fails_everything() {
        let model = fixture::student().unwrap();
        let checks = run_checks(&model, -1.0).unwrap();
        assert!(checks.iter().all(|c| c.status == CheckStatus::Failed));
    }

    #[test]
    fn broken_tree_is_an_error() {
        let mut model = fixture::student().unwrap();
        model.tree.adj.pop();
        assert!(run_checks(&model, DEFAULT_TOLERANCE).is_err());
    }
}
