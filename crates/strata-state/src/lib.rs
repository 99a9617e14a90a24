//! The shared field registry for Strata process kernels.
//!
//! A [`State`] owns every named [`Field`] of one simulation snapshot.
//! Kernels register the fields they need with
//! [`require_field`](State::require_field) during setup; the first kernel
//! to claim a field becomes its sole writer. Independent variables stay
//! owned by the registry and are initialized from configuration by
//! [`initialize`](State::initialize).
//!
//! Snapshots derived with [`derive_snapshot`](State::derive_snapshot) share
//! the field layout of their primary and can be reset from it with
//! [`assign_from`](State::assign_from), which is how a driver keeps a
//! committed and a trial state.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod field;
mod init;
pub mod registry;
pub mod storage;
pub mod vis;

pub use field::Field;
pub use registry::{FieldHandle, State, StateStatus, WriteCapability};
pub use storage::FieldData;
pub use vis::{MemoryVis, VisError, VisSink, VisStep};
