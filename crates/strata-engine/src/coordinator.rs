//! The time-integration driver.
//!
//! [`Coordinator`] owns the top-level process kernel and two structurally
//! identical registries: the committed state and a trial state derived from
//! it. Each step resets the trial from the committed state, advances the
//! kernel into it and, on success, swaps the two. A failed step leaves the
//! committed state untouched and is retried with a smaller `dt`.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use strata_core::{ParameterList, PkError, RegistryError};
use strata_mesh::Mesh;
use strata_pk::{AdvanceContext, ProcessKernel};
use strata_state::{State, VisError, VisSink};
use tracing::{debug, info, warn};

use crate::config::{ConfigError, CoordinatorConfig};

/// Relative tolerance on reaching the end time.
const END_TIME_TOLERANCE: f64 = 1.0e-12;

// ── CoordinatorError ─────────────────────────────────────────────

/// Errors from setting up or running a [`Coordinator`].
#[derive(Clone, Debug, PartialEq)]
pub enum CoordinatorError {
    /// The coordinator configuration is invalid.
    Config(ConfigError),
    /// Field registration or initialization failed.
    Registry(RegistryError),
    /// Some fields had no initial condition after initialization.
    Uninitialized {
        /// Names of the offending fields.
        fields: Vec<String>,
    },
    /// Cutting `dt` after a failure would go below the minimum step.
    TimeStepTooSmall {
        /// The step size that would have been tried next.
        dt: f64,
        /// The configured minimum.
        min_dt: f64,
        /// The failure that triggered the cut.
        source: PkError,
    },
    /// Too many failed attempts in a row.
    TooManyFailures {
        /// Consecutive failures so far.
        count: u32,
        /// The last failure.
        source: PkError,
    },
    /// Visualization output failed.
    Vis(VisError),
    /// A step was requested after the end of the run.
    Finished {
        /// Current simulation time.
        time: f64,
        /// Current cycle.
        cycle: u64,
    },
}

impl fmt::Display for CoordinatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Registry(e) => write!(f, "registry: {e}"),
            Self::Uninitialized { fields } => {
                write!(f, "fields without initial condition: {}", fields.join(", "))
            }
            Self::TimeStepTooSmall { dt, min_dt, source } => {
                write!(f, "time step {dt} below minimum {min_dt} after: {source}")
            }
            Self::TooManyFailures { count, source } => {
                write!(f, "{count} consecutive failed steps, last: {source}")
            }
            Self::Vis(e) => write!(f, "visualization: {e}"),
            Self::Finished { time, cycle } => {
                write!(f, "run already finished at time {time}, cycle {cycle}")
            }
        }
    }
}

impl Error for CoordinatorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Registry(e) => Some(e),
            Self::TimeStepTooSmall { source, .. } | Self::TooManyFailures { source, .. } => {
                Some(source)
            }
            Self::Vis(e) => Some(e),
            Self::Uninitialized { .. } | Self::Finished { .. } => None,
        }
    }
}

impl From<ConfigError> for CoordinatorError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<RegistryError> for CoordinatorError {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

impl From<VisError> for CoordinatorError {
    fn from(e: VisError) -> Self {
        Self::Vis(e)
    }
}

// ── Reports ──────────────────────────────────────────────────────

/// Outcome of one accepted step.
#[derive(Clone, Debug, PartialEq)]
pub struct StepReport {
    /// Size of the accepted step.
    pub dt: f64,
    /// Simulation time after the step.
    pub time: f64,
    /// Cycle after the step.
    pub cycle: u64,
    /// Failed attempts before this one succeeded.
    pub failed_attempts: u32,
    /// Whether a visualization record was written.
    pub vis_written: bool,
}

/// Totals for a whole [`Coordinator::run`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunSummary {
    /// Accepted steps.
    pub steps: u64,
    /// Failed attempts across the run.
    pub failed_attempts: u64,
    /// Final simulation time.
    pub time: f64,
    /// Final cycle.
    pub cycle: u64,
}

// ── Coordinator ──────────────────────────────────────────────────

/// Drives a process kernel through time.
///
/// Construction runs the full setup sequence:
///
/// 1. `pk.setup` registers fields.
/// 2. `pk.initialize` lets kernels set their own initial conditions.
/// 3. [`State::initialize`] fills the rest from configuration.
/// 4. Every field must now be initialized.
/// 5. The trial state is derived from the committed one.
pub struct Coordinator {
    pk: Box<dyn ProcessKernel>,
    committed: State,
    trial: State,
    config: CoordinatorConfig,
    dt: f64,
    consecutive_failures: u32,
    total_failures: u64,
}

impl Coordinator {
    /// Set up `pk` on `state` and prepare to run.
    pub fn new(
        mut pk: Box<dyn ProcessKernel>,
        mut state: State,
        config: CoordinatorConfig,
    ) -> Result<Self, CoordinatorError> {
        config.validate()?;

        pk.setup(&mut state)?;
        pk.initialize(&mut state)?;
        state.initialize()?;
        if !state.check_all_initialized() {
            let fields = state
                .uninitialized_fields()
                .into_iter()
                .map(str::to_string)
                .collect();
            return Err(CoordinatorError::Uninitialized { fields });
        }
        state.set_time(config.start_time);
        state.set_cycle(0);

        let trial = state.derive_snapshot();
        info!(
            kernel = pk.name(),
            fields = state.len(),
            start = config.start_time,
            end = config.end_time,
            dt = config.initial_dt,
            "coordinator ready"
        );
        Ok(Self {
            pk,
            committed: state,
            trial,
            dt: config.initial_dt,
            config,
            consecutive_failures: 0,
            total_failures: 0,
        })
    }

    /// Build the registry and the configuration from one parameter list.
    ///
    /// The registry initializes from `params`; the coordinator reads its
    /// own settings from the `"Coordinator"` sublist.
    pub fn from_params(
        pk: Box<dyn ProcessKernel>,
        mesh: Arc<dyn Mesh>,
        params: ParameterList,
    ) -> Result<Self, CoordinatorError> {
        let config = CoordinatorConfig::from_params(&params)?;
        Self::new(pk, State::with_params(mesh, params), config)
    }

    /// Whether the end time or end cycle has been reached.
    pub fn is_finished(&self) -> bool {
        let time = self.committed.time();
        let end = self.config.end_time;
        let reached_time = end - time <= END_TIME_TOLERANCE * end.abs().max(1.0);
        let reached_cycle = self
            .config
            .end_cycle
            .is_some_and(|c| self.committed.cycle() >= c);
        reached_time || reached_cycle
    }

    /// Take one accepted step, retrying with smaller `dt` on failure.
    ///
    /// On error the committed state is unchanged.
    pub fn step(&mut self, vis: &mut dyn VisSink) -> Result<StepReport, CoordinatorError> {
        if self.is_finished() {
            return Err(CoordinatorError::Finished {
                time: self.committed.time(),
                cycle: self.committed.cycle(),
            });
        }
        let mut failed_attempts = 0;
        loop {
            let dt = self.next_dt();
            self.trial.assign_from(&self.committed)?;

            let result = {
                let mut ctx = AdvanceContext::new(&self.committed, &mut self.trial, dt);
                self.pk.advance(&mut ctx)
            };

            match result {
                Ok(()) => {
                    let report = self.accept(dt, failed_attempts, vis)?;
                    return Ok(report);
                }
                Err(source) => {
                    failed_attempts += 1;
                    self.reject(dt, source)?;
                }
            }
        }
    }

    /// Step until the end time or end cycle, writing the initial state to
    /// `vis` first.
    pub fn run(&mut self, vis: &mut dyn VisSink) -> Result<RunSummary, CoordinatorError> {
        self.committed.write_vis(vis)?;
        let mut summary = RunSummary::default();
        while !self.is_finished() {
            let report = self.step(vis)?;
            summary.steps += 1;
            summary.failed_attempts += u64::from(report.failed_attempts);
        }
        summary.time = self.committed.time();
        summary.cycle = self.committed.cycle();
        info!(
            steps = summary.steps,
            failed = summary.failed_attempts,
            time = summary.time,
            "run complete"
        );
        Ok(summary)
    }

    /// The last accepted state.
    pub fn state(&self) -> &State {
        &self.committed
    }

    /// The top-level process kernel.
    pub fn kernel(&self) -> &dyn ProcessKernel {
        self.pk.as_ref()
    }

    /// The step size the next attempt starts from, before clipping.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Failed attempts since the last accepted step.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Failed attempts over the whole run.
    pub fn total_failures(&self) -> u64 {
        self.total_failures
    }

    /// The active configuration.
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    // ── Internals ────────────────────────────────────────────────

    /// Current `dt`, clipped by the kernel's `max_dt` and the end time.
    fn next_dt(&self) -> f64 {
        let mut dt = self.dt;
        if let Some(max) = self.pk.max_dt() {
            dt = dt.min(max);
        }
        dt.min(self.config.end_time - self.committed.time())
    }

    fn accept(
        &mut self,
        dt: f64,
        failed_attempts: u32,
        vis: &mut dyn VisSink,
    ) -> Result<StepReport, CoordinatorError> {
        let time = self.committed.time() + dt;
        let cycle = self.committed.cycle() + 1;
        self.trial.set_time(time);
        self.trial.set_cycle(cycle);
        self.pk.commit(dt, &self.trial);
        std::mem::swap(&mut self.committed, &mut self.trial);
        self.consecutive_failures = 0;

        let vis_written = self.committed.write_vis(vis)?;
        debug!(cycle, time, dt, failed_attempts, "step accepted");
        Ok(StepReport {
            dt,
            time,
            cycle,
            failed_attempts,
            vis_written,
        })
    }

    fn reject(&mut self, dt: f64, source: PkError) -> Result<(), CoordinatorError> {
        self.consecutive_failures += 1;
        self.total_failures += 1;
        self.trial.assign_from(&self.committed)?;

        if self.consecutive_failures > self.config.max_consecutive_failures {
            return Err(CoordinatorError::TooManyFailures {
                count: self.consecutive_failures,
                source,
            });
        }
        let next = dt * self.config.dt_reduction;
        if next < self.config.min_dt {
            return Err(CoordinatorError::TimeStepTooSmall {
                dt: next,
                min_dt: self.config.min_dt,
                source,
            });
        }
        warn!(
            cycle = self.committed.cycle(),
            dt,
            next_dt = next,
            error = %source,
            "step failed, cutting time step"
        );
        self.dt = next;
        Ok(())
    }
}

impl fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("kernel", &self.pk.name())
            .field("time", &self.committed.time())
            .field("cycle", &self.committed.cycle())
            .field("dt", &self.dt)
            .field("consecutive_failures", &self.consecutive_failures)
            .finish()
    }
}
