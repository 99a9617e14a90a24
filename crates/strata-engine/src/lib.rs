//! Time-integration driver for Strata simulations.
//!
//! The [`Coordinator`] owns the committed and trial registries, advances
//! the top-level process kernel, retries failed steps with a smaller
//! `dt`, and writes visualization after every accepted step.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use strata_core::ParameterList;
//! use strata_engine::Coordinator;
//! use strata_mesh::ColumnMesh;
//! use strata_pk::{ProcessKernel, WeakCoupler};
//! use strata_state::MemoryVis;
//!
//! # fn kernels() -> Vec<Box<dyn ProcessKernel>> { unimplemented!() }
//! let params = ParameterList::new()
//!     .with_f64("Gravity x", 0.0)
//!     .with_f64("Gravity y", 0.0)
//!     .with_f64("Gravity z", -9.80665)
//!     .with_list(
//!         "Coordinator",
//!         ParameterList::new()
//!             .with_f64("End time", 86400.0)
//!             .with_f64("Initial time step", 3600.0),
//!     );
//! let mesh = Arc::new(ColumnMesh::new(20, 0.5, 1.0).unwrap());
//! let pk = WeakCoupler::new("permafrost", kernels()).unwrap();
//!
//! let mut coordinator = Coordinator::from_params(Box::new(pk), mesh, params).unwrap();
//! let summary = coordinator.run(&mut MemoryVis::every(6)).unwrap();
//! println!("{} steps", summary.steps);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod coordinator;

pub use config::{ConfigError, CoordinatorConfig};
pub use coordinator::{Coordinator, CoordinatorError, RunSummary, StepReport};
