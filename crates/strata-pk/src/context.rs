//! Execution context passed to process kernels during a step.

use strata_state::State;

/// What a kernel sees while advancing one step.
///
/// - **`previous()`** is the committed snapshot at the start of the step.
///   It never changes during the step.
/// - **`state()` / `state_mut()`** is the trial snapshot. Kernels earlier
///   in a weak coupler have already written their results into it, so a
///   later kernel reads them (sequential, operator-split coupling).
///
/// Writes still go through the registry's owner checks; holding the
/// context does not grant access to fields owned by other kernels.
pub struct AdvanceContext<'a> {
    previous: &'a State,
    next: &'a mut State,
    dt: f64,
}

impl<'a> AdvanceContext<'a> {
    /// Construct a context for a step of size `dt` from `previous` into `next`.
    ///
    /// Typically called by the driver, not by kernels directly.
    pub fn new(previous: &'a State, next: &'a mut State, dt: f64) -> Self {
        Self { previous, next, dt }
    }

    /// Committed snapshot at the start of the step.
    ///
    /// Borrowed for the whole step, so it can be held across
    /// [`state_mut`](Self::state_mut).
    pub fn previous(&self) -> &'a State {
        self.previous
    }

    /// Trial snapshot being advanced.
    pub fn state(&self) -> &State {
        self.next
    }

    /// Trial snapshot being advanced, mutably.
    pub fn state_mut(&mut self) -> &mut State {
        self.next
    }

    /// Step size.
    pub fn dt(&self) -> f64 {
        self.dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use strata_core::{FieldLocation, Owner};
    use strata_mesh::ColumnMesh;

    #[test]
    fn writes_land_in_trial_only() {
        let owner = Owner::kernel("energy");
        let mut committed = State::new(Arc::new(ColumnMesh::new(3, 1.0, 1.0).unwrap()));
        let _ = committed
            .require_field("temperature", FieldLocation::Cell, owner.clone(), 1)
            .unwrap();
        let mut trial = committed.derive_snapshot();

        let mut ctx = AdvanceContext::new(&committed, &mut trial, 0.5);
        ctx.state_mut()
            .set_field_constant("temperature", &owner, &[273.15])
            .unwrap();
        assert_eq!(ctx.dt(), 0.5);
        assert_eq!(ctx.previous().field("temperature").unwrap().norm_inf(), 0.0);
        assert_eq!(ctx.state().field("temperature").unwrap().norm_inf(), 273.15);
    }
}
