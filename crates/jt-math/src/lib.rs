//! Junction tree math: scopes, assignments, and discrete factors.

pub mod math;

pub use math::error::FactorError;
pub use math::factor::Factor;
pub use math::scope::{Assignment, Scope, VarId};
