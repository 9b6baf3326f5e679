//! The closed set of failure kinds the search core can raise.
//!
//! Every variant here aborts the current `solve` call; deadline expiry is
//! deliberately **not** represented here (see [`crate::search::SolveOutcome`]),
//! since running out of time is a normal, non-fatal outcome.

use derive_more::{Display, Error};

#[derive(Debug, Display, Error, PartialEq, Clone)]
pub enum SearchError {
    #[display("value {value} is not a member of the domain of variable {variable_id}")]
    OutOfDomain { variable_id: u64, value: i64 },

    #[display("index {index} is out of range [0, {size})")]
    OutOfRange { index: usize, size: usize },

    #[display("constraint {constraint_id} was queried about variable {variable_id}, which it does not read")]
    VariableOutOfScope { constraint_id: u64, variable_id: u64 },

    #[display("constraint {constraint_id} does not implement delta_error")]
    DeltaNotDefined { constraint_id: u64 },

    #[display("constraint or objective evaluation produced NaN")]
    Nan,
}
