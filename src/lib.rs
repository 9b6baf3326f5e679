//! A real-time meta-heuristic search core for CSP/COP and error-function
//! variants (EF-CSP/EF-COP).
//!
//! The engine searches for a variable assignment that drives the total
//! constraint error to zero while optimizing an objective when one is
//! given, under a strict wall-clock budget. It is a stochastic local
//! search: no backtracking, no completeness or optimality guarantee. See
//! [`search`] for the driver and [`model`] for the pieces a caller
//! assembles to describe a problem.

pub mod auxiliary;
pub mod constraint;
pub mod domain;
pub mod error;
pub mod heuristics;
pub mod model;
pub mod objective;
pub mod projection;
pub mod search;
pub mod terminators;
pub mod variable;

pub use error::SearchError;
pub use model::Model;
pub use search::{SearchDriver, SolveOutcome, SolverOptions};
