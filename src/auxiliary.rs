//! Optional user-supplied derived state kept consistent with the current
//! assignment.

use dyn_clone::DynClone;

/// A block of derived quantities (e.g. running coefficients) that must stay
/// in sync with the current variable assignment.
///
/// The driver invokes [`AuxiliaryData::update`] immediately before it
/// commits a value change, so implementations always see the *old* value
/// still installed on the variable at `var_index` when `update` is called.
pub trait AuxiliaryData: DynClone {
    fn update(&mut self, var_index: u64, new_value: i64);
}

dyn_clone::clone_trait_object!(AuxiliaryData);

/// The auxiliary data used when the model declares none.
#[derive(Debug, Clone, Default)]
pub struct NullAuxiliaryData;

impl AuxiliaryData for NullAuxiliaryData {
    fn update(&mut self, _var_index: u64, _new_value: i64) {}
}
