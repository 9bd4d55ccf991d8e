//! Junction tree core: Bayesian networks, variable elimination, and
//! clique-tree calibration.
//!
//! This crate provides:
//! - [`Network`]: one CPD per variable with validation on insert
//! - [`Network::var_elim`]: joint marginals by variable elimination
//! - [`Network::calibrate`]: two-pass sum-product over a clique tree
//! - Reports, self-checks, and the `jt-core` command-line driver

pub mod calibrate;
pub mod check;
pub mod cli;
pub mod elimination;
pub mod exit_codes;
pub mod fixture;
pub mod logging;
pub mod model;
pub mod network;
pub mod report;

pub use calibrate::{edge_key, CalibratedPotentials, CliqueTree};
pub use exit_codes::ExitCode;
pub use model::InferenceModel;
pub use network::{Network, CPD_TOLERANCE};
