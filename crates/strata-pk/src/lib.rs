//! Process-kernel contract and coupling strategies for Strata.
//!
//! - [`ProcessKernel`] is the lifecycle every physics module implements.
//! - [`AdvanceContext`] carries the committed and trial states into a step.
//! - [`Mpc`] holds an ordered set of sub-kernels.
//! - [`WeakCoupler`] advances them sequentially and stops at the first
//!   failure.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod context;
pub mod kernel;
pub mod mpc;
pub mod weak;

pub use context::AdvanceContext;
pub use kernel::ProcessKernel;
pub use mpc::{CouplerError, Mpc};
pub use weak::WeakCoupler;
