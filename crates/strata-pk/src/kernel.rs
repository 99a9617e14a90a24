//! The [`ProcessKernel`] trait.
//!
//! A process kernel (PK) is one physics module: flow, energy, a surface
//! process, or a coupler composing several of them. The driver sees only
//! this trait.

use crate::context::AdvanceContext;
use strata_core::{PkError, RegistryError};
use strata_state::State;

/// The lifecycle every physics module implements.
///
/// # Contract
///
/// 1. [`setup`](ProcessKernel::setup) declares fields with
///    [`State::require_field`], claiming the ones the kernel evolves.
/// 2. [`initialize`](ProcessKernel::initialize) assigns initial conditions
///    the kernel is responsible for and marks them initialized. It runs
///    before the registry's own configuration-driven pass.
/// 3. [`advance`](ProcessKernel::advance) takes one step. On `Err` the
///    trial state may be discarded by the driver; a kernel must report
///    failure instead of leaving partial writes unflagged.
/// 4. [`commit`](ProcessKernel::commit) is called once the whole step is
///    accepted, with the accepted state.
///
/// # Object safety
///
/// This trait is object-safe; couplers store kernels as
/// `Vec<Box<dyn ProcessKernel>>`.
///
/// # Examples
///
/// ```
/// use strata_core::{FieldLocation, Owner, PkError, RegistryError};
/// use strata_pk::{AdvanceContext, ProcessKernel};
/// use strata_state::State;
///
/// struct Heater {
///     owner: Owner,
/// }
///
/// impl ProcessKernel for Heater {
///     fn name(&self) -> &str { "heater" }
///
///     fn setup(&mut self, state: &mut State) -> Result<(), RegistryError> {
///         let _ = state.require_field("temperature", FieldLocation::Cell, self.owner.clone(), 1)?;
///         Ok(())
///     }
///
///     fn initialize(&mut self, state: &mut State) -> Result<(), RegistryError> {
///         state.set_field_constant("temperature", &self.owner, &[270.0])?;
///         state.mark_initialized("temperature", &self.owner)
///     }
///
///     fn advance(&mut self, ctx: &mut AdvanceContext<'_>) -> Result<(), PkError> {
///         let dt = ctx.dt();
///         let t = ctx.state_mut().field_mut("temperature", &self.owner)?;
///         t.as_mut_slice().iter_mut().for_each(|v| *v += dt);
///         Ok(())
///     }
/// }
///
/// let pk = Heater { owner: Owner::kernel("heater") };
/// assert_eq!(pk.name(), "heater");
/// assert_eq!(pk.max_dt(), None);
/// ```
pub trait ProcessKernel: Send + 'static {
    /// Unique name, used as the owner identity and in error reports.
    fn name(&self) -> &str;

    /// Register the fields this kernel reads and owns.
    fn setup(&mut self, state: &mut State) -> Result<(), RegistryError>;

    /// Assign initial conditions for owned fields.
    ///
    /// Default: nothing; owned fields then rely on configuration constants.
    fn initialize(&mut self, state: &mut State) -> Result<(), RegistryError> {
        let _ = state;
        Ok(())
    }

    /// Advance from `ctx.previous()` to `ctx.state_mut()` over `ctx.dt()`.
    fn advance(&mut self, ctx: &mut AdvanceContext<'_>) -> Result<(), PkError>;

    /// Finalize an accepted step.
    ///
    /// Default: no-op.
    fn commit(&mut self, dt: f64, state: &State) {
        let _ = (dt, state);
    }

    /// Largest step this kernel can currently take.
    ///
    /// Return `None` to impose no constraint.
    fn max_dt(&self) -> Option<f64> {
        None
    }
}
