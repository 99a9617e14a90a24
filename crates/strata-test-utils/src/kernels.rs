//! Reusable process-kernel fixtures.
//!
//! - [`RecordingKernel`]: does nothing but log its lifecycle calls.
//! - [`ConstantKernel`]: owns a cell field and writes a constant into it.
//! - [`RateKernel`]: owns a cell field and integrates a constant rate.
//! - [`FailingKernel`]: fails deterministically after N advances.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use strata_core::{FieldLocation, Owner, PkError, RegistryError};
use strata_pk::{AdvanceContext, ProcessKernel};
use strata_state::State;

/// Shared, ordered record of `"<kernel>:<call>"` entries.
///
/// Clone it into several kernels to observe the interleaving of their calls.
#[derive(Clone, Debug, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, kernel: &str, call: &str) {
        self.0
            .lock()
            .expect("call log poisoned")
            .push(format!("{kernel}:{call}"));
    }

    /// Snapshot of every entry so far.
    pub fn entries(&self) -> Vec<String> {
        self.0.lock().expect("call log poisoned").clone()
    }

    /// Entries for one call kind, e.g. `"advance"`, as kernel names.
    pub fn kernels_for(&self, call: &str) -> Vec<String> {
        let suffix = format!(":{call}");
        self.entries()
            .into_iter()
            .filter_map(|e| e.strip_suffix(&suffix).map(str::to_string))
            .collect()
    }
}

/// Logs every lifecycle call and otherwise does nothing.
pub struct RecordingKernel {
    pub name: String,
    pub log: CallLog,
    pub max_dt: Option<f64>,
}

impl RecordingKernel {
    pub fn new(name: impl Into<String>, log: &CallLog) -> Self {
        Self {
            name: name.into(),
            log: log.clone(),
            max_dt: None,
        }
    }

    /// Report `max_dt` from [`ProcessKernel::max_dt`].
    pub fn with_max_dt(mut self, max_dt: f64) -> Self {
        self.max_dt = Some(max_dt);
        self
    }
}

impl ProcessKernel for RecordingKernel {
    fn name(&self) -> &str {
        &self.name
    }

    fn setup(&mut self, _state: &mut State) -> Result<(), RegistryError> {
        self.log.record(&self.name, "setup");
        Ok(())
    }

    fn initialize(&mut self, _state: &mut State) -> Result<(), RegistryError> {
        self.log.record(&self.name, "initialize");
        Ok(())
    }

    fn advance(&mut self, _ctx: &mut AdvanceContext<'_>) -> Result<(), PkError> {
        self.log.record(&self.name, "advance");
        Ok(())
    }

    fn commit(&mut self, _dt: f64, _state: &State) {
        self.log.record(&self.name, "commit");
    }

    fn max_dt(&self) -> Option<f64> {
        self.max_dt
    }
}

/// Owns a one-dof cell field, initializes it to `value` and rewrites
/// `value` on every advance.
pub struct ConstantKernel {
    pub name: String,
    pub field: String,
    pub value: f64,
    owner: Owner,
}

impl ConstantKernel {
    pub fn new(name: impl Into<String>, field: impl Into<String>, value: f64) -> Self {
        let name = name.into();
        Self {
            owner: Owner::kernel(name.clone()),
            name,
            field: field.into(),
            value,
        }
    }
}

impl ProcessKernel for ConstantKernel {
    fn name(&self) -> &str {
        &self.name
    }

    fn setup(&mut self, state: &mut State) -> Result<(), RegistryError> {
        let _ = state.require_field(&self.field, FieldLocation::Cell, self.owner.clone(), 1)?;
        state.set_subfield_names(&self.field, vec![self.field.clone()])
    }

    fn initialize(&mut self, state: &mut State) -> Result<(), RegistryError> {
        state.set_field_constant(&self.field, &self.owner, &[self.value])?;
        state.mark_initialized(&self.field, &self.owner)
    }

    fn advance(&mut self, ctx: &mut AdvanceContext<'_>) -> Result<(), PkError> {
        ctx.state_mut()
            .set_field_constant(&self.field, &self.owner, &[self.value])?;
        Ok(())
    }
}

/// Owns a one-dof cell field and integrates `d(field)/dt = rate`.
///
/// The new value is computed from the committed state, so a discarded
/// and retried step gives the same answer as a clean one.
pub struct RateKernel {
    pub name: String,
    pub field: String,
    pub rate: f64,
    owner: Owner,
}

impl RateKernel {
    pub fn new(name: impl Into<String>, field: impl Into<String>, rate: f64) -> Self {
        let name = name.into();
        Self {
            owner: Owner::kernel(name.clone()),
            name,
            field: field.into(),
            rate,
        }
    }
}

impl ProcessKernel for RateKernel {
    fn name(&self) -> &str {
        &self.name
    }

    fn setup(&mut self, state: &mut State) -> Result<(), RegistryError> {
        let _ = state.require_field(&self.field, FieldLocation::Cell, self.owner.clone(), 1)?;
        state.set_subfield_names(&self.field, vec![self.field.clone()])
    }

    fn advance(&mut self, ctx: &mut AdvanceContext<'_>) -> Result<(), PkError> {
        let increment = self.rate * ctx.dt();
        let old = ctx.previous().field(&self.field)?;
        let new = ctx.state_mut().field_mut(&self.field, &self.owner)?;
        for (n, o) in new.as_mut_slice().iter_mut().zip(old.as_slice()) {
            *n = o + increment;
        }
        Ok(())
    }
}

/// Fails deterministically after a configurable number of successful
/// advances.
///
/// With [`writing`](FailingKernel::writing) it also owns a cell field and
/// poisons it with `NaN` before failing, to check that the driver discards
/// partial writes.
pub struct FailingKernel {
    pub name: String,
    pub succeed_count: usize,
    field: Option<String>,
    owner: Owner,
    calls: Arc<AtomicUsize>,
    log: Option<CallLog>,
}

impl FailingKernel {
    /// A kernel that succeeds `succeed_count` times, then always fails.
    pub fn new(name: impl Into<String>, succeed_count: usize) -> Self {
        let name = name.into();
        Self {
            owner: Owner::kernel(name.clone()),
            name,
            succeed_count,
            field: None,
            calls: Arc::new(AtomicUsize::new(0)),
            log: None,
        }
    }

    /// Own `field`, initialize it to zero and poison it on failure.
    pub fn writing(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Also record calls into `log`.
    pub fn logging(mut self, log: &CallLog) -> Self {
        self.log = Some(log.clone());
        self
    }

    /// Shared counter of `advance` calls, readable after the kernel has
    /// been moved into a coupler.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl ProcessKernel for FailingKernel {
    fn name(&self) -> &str {
        &self.name
    }

    fn setup(&mut self, state: &mut State) -> Result<(), RegistryError> {
        if let Some(field) = &self.field {
            let _ = state.require_field(field, FieldLocation::Cell, self.owner.clone(), 1)?;
        }
        Ok(())
    }

    fn initialize(&mut self, state: &mut State) -> Result<(), RegistryError> {
        if let Some(field) = &self.field {
            state.mark_initialized(field, &self.owner)?;
        }
        Ok(())
    }

    fn advance(&mut self, ctx: &mut AdvanceContext<'_>) -> Result<(), PkError> {
        if let Some(log) = &self.log {
            log.record(&self.name, "advance");
        }
        let n = self.calls.fetch_add(1, Ordering::Relaxed);
        let failing = n >= self.succeed_count;
        if let Some(field) = &self.field {
            let value = if failing { f64::NAN } else { n as f64 };
            ctx.state_mut()
                .set_field_constant(field, &self.owner, &[value])?;
        }
        if failing {
            return Err(PkError::failed(format!(
                "deliberate failure after {} successful calls",
                self.succeed_count
            )));
        }
        Ok(())
    }

    fn commit(&mut self, _dt: f64, _state: &State) {
        if let Some(log) = &self.log {
            log.record(&self.name, "commit");
        }
    }
}
