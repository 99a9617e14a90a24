//! Test utilities and mock process kernels for Strata development.
//!
//! Provides mesh and configuration fixtures plus a handful of
//! [`ProcessKernel`](strata_pk::ProcessKernel) implementations for
//! exercising couplers and the coordinator.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod kernels;

pub use fixtures::{column_mesh, gravity_params, two_block_column};
pub use kernels::{CallLog, ConstantKernel, FailingKernel, RateKernel, RecordingKernel};
