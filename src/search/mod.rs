//! The search driver: `SolverOptions` configures it, `SearchDriver::solve`
//! runs it. See [`driver`] for the state machine itself.

pub mod driver;
pub mod options;
pub mod unit_data;

pub use driver::{SearchDriver, SolveOutcome};
pub use options::SolverOptions;
pub use unit_data::SearchUnitData;
