//! Coordinator configuration, validation, and error types.
//!
//! [`CoordinatorConfig`] controls the time-integration loop: the simulated
//! interval, the step-size schedule and the failure budget.
//! [`from_params`](CoordinatorConfig::from_params) reads it from the
//! `"Coordinator"` sublist of the run's configuration.

use std::error::Error;
use std::fmt;

use strata_core::{ParameterError, ParameterList};

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while reading or validating a [`CoordinatorConfig`].
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// A key was missing or had the wrong type.
    Parameter(ParameterError),
    /// A time or step size is NaN, infinite, or out of range.
    InvalidTime {
        /// Which setting.
        name: &'static str,
        /// The invalid value.
        value: f64,
    },
    /// The end time precedes the start time.
    EndBeforeStart {
        /// Configured start time.
        start: f64,
        /// Configured end time.
        end: f64,
    },
    /// The step reduction factor is outside `(0, 1)`.
    InvalidReductionFactor {
        /// The invalid value.
        value: f64,
    },
    /// An integer setting is negative or too large.
    InvalidCount {
        /// Which setting.
        name: &'static str,
        /// The invalid value.
        value: i64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parameter(e) => write!(f, "parameter: {e}"),
            Self::InvalidTime { name, value } => {
                write!(f, "{name} must be finite and in range, got {value}")
            }
            Self::EndBeforeStart { start, end } => {
                write!(f, "end time {end} is before start time {start}")
            }
            Self::InvalidReductionFactor { value } => {
                write!(f, "time step reduction factor must be in (0, 1), got {value}")
            }
            Self::InvalidCount { name, value } => {
                write!(f, "{name} must be a non-negative 32-bit count, got {value}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parameter(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParameterError> for ConfigError {
    fn from(e: ParameterError) -> Self {
        Self::Parameter(e)
    }
}

// ── CoordinatorConfig ──────────────────────────────────────────────

/// Name of the configuration sublist read by [`CoordinatorConfig::from_params`].
pub const COORDINATOR_SUBLIST: &str = "Coordinator";

/// Settings for the time-integration loop.
#[derive(Clone, Debug, PartialEq)]
pub struct CoordinatorConfig {
    /// Simulation time of the initial state. Default: 0.
    pub start_time: f64,
    /// Simulation time to stop at.
    pub end_time: f64,
    /// Optional cycle count to stop at, whichever comes first.
    pub end_cycle: Option<u64>,
    /// First step size attempted.
    pub initial_dt: f64,
    /// Smallest step size tried before giving up. Default: 1e-10.
    pub min_dt: f64,
    /// Factor applied to `dt` after a failed step. Default: 0.5.
    pub dt_reduction: f64,
    /// Failed attempts allowed in a row before giving up. Default: 10.
    pub max_consecutive_failures: u32,
}

impl CoordinatorConfig {
    /// A configuration running from 0 to `end_time` starting with `initial_dt`.
    pub fn new(end_time: f64, initial_dt: f64) -> Self {
        Self {
            start_time: 0.0,
            end_time,
            end_cycle: None,
            initial_dt,
            min_dt: 1.0e-10,
            dt_reduction: 0.5,
            max_consecutive_failures: 10,
        }
    }

    /// Read the `"Coordinator"` sublist of `params` and validate it.
    ///
    /// `"End time"` and `"Initial time step"` are required; the other keys
    /// fall back to the defaults of [`new`](Self::new).
    pub fn from_params(params: &ParameterList) -> Result<Self, ConfigError> {
        let list = params.sublist(COORDINATOR_SUBLIST)?;
        let mut config = Self::new(list.get_f64("End time")?, list.get_f64("Initial time step")?);
        config.start_time = list.get_f64_or("Start time", config.start_time)?;
        config.min_dt = list.get_f64_or("Minimum time step", config.min_dt)?;
        config.dt_reduction = list.get_f64_or("Time step reduction factor", config.dt_reduction)?;
        if let Some(cycle) = list.get_i64_opt("End cycle")? {
            config.end_cycle = Some(u64::try_from(cycle).map_err(|_| ConfigError::InvalidCount {
                name: "End cycle",
                value: cycle,
            })?);
        }
        if let Some(n) = list.get_i64_opt("Max consecutive failures")? {
            config.max_consecutive_failures =
                u32::try_from(n).map_err(|_| ConfigError::InvalidCount {
                    name: "Max consecutive failures",
                    value: n,
                })?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Check all invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.start_time.is_finite() {
            return Err(ConfigError::InvalidTime {
                name: "start time",
                value: self.start_time,
            });
        }
        if !self.end_time.is_finite() {
            return Err(ConfigError::InvalidTime {
                name: "end time",
                value: self.end_time,
            });
        }
        if self.end_time < self.start_time {
            return Err(ConfigError::EndBeforeStart {
                start: self.start_time,
                end: self.end_time,
            });
        }
        if !self.initial_dt.is_finite() || self.initial_dt <= 0.0 {
            return Err(ConfigError::InvalidTime {
                name: "initial time step",
                value: self.initial_dt,
            });
        }
        if !self.min_dt.is_finite() || self.min_dt <= 0.0 || self.min_dt > self.initial_dt {
            return Err(ConfigError::InvalidTime {
                name: "minimum time step",
                value: self.min_dt,
            });
        }
        if !self.dt_reduction.is_finite() || self.dt_reduction <= 0.0 || self.dt_reduction >= 1.0 {
            return Err(ConfigError::InvalidReductionFactor {
                value: self.dt_reduction,
            });
        }
        Ok(())
    }
}
