//! Visualization output contract.
//!
//! The registry knows which fields to emit; a [`VisSink`] knows when and
//! where. File formats live behind the trait.

use std::error::Error;
use std::fmt;

use tracing::debug;

use crate::registry::State;
use crate::storage::FieldData;

/// A sink that receives periodic field snapshots.
pub trait VisSink {
    /// Whether a snapshot is due at `cycle`.
    fn dump_requested(&self, cycle: u64) -> bool;

    /// Whether output has been switched off entirely.
    fn is_disabled(&self) -> bool;

    /// Open a new timestep record.
    fn create_timestep(&mut self, time: f64, cycle: u64) -> Result<(), VisError>;

    /// Write one field's values tagged with its component names.
    fn write_vector(&mut self, data: &FieldData, names: &[String]) -> Result<(), VisError>;
}

/// Failure reported by a [`VisSink`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VisError {
    /// The sink could not write the record.
    WriteFailed {
        /// Sink-specific detail.
        reason: String,
    },
}

impl fmt::Display for VisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WriteFailed { reason } => write!(f, "visualization write failed: {reason}"),
        }
    }
}

impl Error for VisError {}

impl State {
    /// Emit every `io_vis` field to `sink` if it wants a snapshot now.
    ///
    /// Returns `Ok(true)` if a timestep was written, `Ok(false)` if the sink
    /// is disabled or not due at the current cycle.
    pub fn write_vis(&self, sink: &mut dyn VisSink) -> Result<bool, VisError> {
        if sink.is_disabled() || !sink.dump_requested(self.cycle()) {
            return Ok(false);
        }
        sink.create_timestep(self.time(), self.cycle())?;
        for field in self.fields().filter(|f| f.io_vis()) {
            debug!(field = field.name(), cycle = self.cycle(), "writing visualization");
            sink.write_vector(field.data(), field.subfield_names())?;
        }
        Ok(true)
    }
}

// ── In-memory sink ───────────────────────────────────────────────

/// One timestep captured by [`MemoryVis`].
#[derive(Clone, Debug, PartialEq)]
pub struct VisStep {
    /// Simulation time of the record.
    pub time: f64,
    /// Cycle of the record.
    pub cycle: u64,
    /// `(component names, values)` per written field, in registry order.
    pub vectors: Vec<(Vec<String>, FieldData)>,
}

/// A [`VisSink`] that keeps every record in memory.
///
/// Dumps every `period` cycles; a period of zero never dumps.
#[derive(Clone, Debug, Default)]
pub struct MemoryVis {
    period: u64,
    disabled: bool,
    steps: Vec<VisStep>,
}

impl MemoryVis {
    /// A sink dumping whenever `cycle % period == 0`.
    pub fn every(period: u64) -> Self {
        Self {
            period,
            ..Self::default()
        }
    }

    /// A sink that never writes.
    pub fn disabled() -> Self {
        Self {
            period: 1,
            disabled: true,
            steps: Vec::new(),
        }
    }

    /// Captured records, oldest first.
    pub fn steps(&self) -> &[VisStep] {
        &self.steps
    }
}

impl VisSink for MemoryVis {
    fn dump_requested(&self, cycle: u64) -> bool {
        self.period != 0 && cycle % self.period == 0
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn create_timestep(&mut self, time: f64, cycle: u64) -> Result<(), VisError> {
        self.steps.push(VisStep {
            time,
            cycle,
            vectors: Vec::new(),
        });
        Ok(())
    }

    fn write_vector(&mut self, data: &FieldData, names: &[String]) -> Result<(), VisError> {
        let step = self.steps.last_mut().ok_or_else(|| VisError::WriteFailed {
            reason: "no open timestep".into(),
        })?;
        step.vectors.push((names.to_vec(), data.clone()));
        Ok(())
    }
}
