//! Strata: a multiphysics field registry and process-kernel coupling
//! framework for subsurface and permafrost simulation.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Strata sub-crates. For most users, adding `strata` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use strata::prelude::*;
//!
//! // A kernel that owns temperature and warms it at a fixed rate.
//! struct Warming {
//!     owner: Owner,
//! }
//!
//! impl ProcessKernel for Warming {
//!     fn name(&self) -> &str { "warming" }
//!
//!     fn setup(&mut self, state: &mut State) -> Result<(), RegistryError> {
//!         let _ = state.require_field("temperature", FieldLocation::Cell, self.owner.clone(), 1)?;
//!         state.set_subfield_names("temperature", vec!["temperature".into()])
//!     }
//!
//!     fn advance(&mut self, ctx: &mut AdvanceContext<'_>) -> Result<(), PkError> {
//!         let dt = ctx.dt();
//!         let old = ctx.previous().field("temperature")?.as_slice();
//!         let new = ctx.state_mut().field_mut("temperature", &self.owner)?;
//!         for (n, o) in new.as_mut_slice().iter_mut().zip(old) {
//!             *n = o + 0.1 * dt;
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let params = ParameterList::new()
//!     .with_f64("Gravity x", 0.0)
//!     .with_f64("Gravity y", 0.0)
//!     .with_f64("Gravity z", -9.80665)
//!     .with_f64("Constant temperature", 270.0);
//! let mesh = Arc::new(ColumnMesh::new(4, 0.5, 1.0).unwrap());
//! let pk = Box::new(Warming { owner: Owner::kernel("warming") });
//!
//! let state = State::with_params(mesh, params);
//! let mut coordinator = Coordinator::new(pk, state, CoordinatorConfig::new(10.0, 1.0)).unwrap();
//! coordinator.run(&mut MemoryVis::disabled()).unwrap();
//!
//! let t = coordinator.state().field("temperature").unwrap();
//! assert!((t.as_slice()[0] - 271.0).abs() < 1e-9);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `strata-core` | IDs, field signatures, owners, parameters, errors |
//! | [`mesh`] | `strata-mesh` | The `Mesh` capability and `ColumnMesh` |
//! | [`state`] | `strata-state` | Field storage, the `State` registry, visualization |
//! | [`pk`] | `strata-pk` | Process-kernel contract and couplers |
//! | [`engine`] | `strata-engine` | The time-integration `Coordinator` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, parameters and errors (`strata-core`).
pub use strata_core as types;

/// Mesh capability (`strata-mesh`).
///
/// Provides the [`mesh::Mesh`] trait and the [`mesh::ColumnMesh`] backend.
pub use strata_mesh as mesh;

/// The field registry (`strata-state`).
///
/// [`state::State`] owns every field; [`state::VisSink`] is the output
/// boundary.
pub use strata_state as state;

/// Process kernels and couplers (`strata-pk`).
pub use strata_pk as pk;

/// The time-integration driver (`strata-engine`).
pub use strata_engine as engine;

/// Common imports for typical Strata usage.
///
/// ```rust
/// use strata::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use strata_core::{FieldId, FieldLocation, FieldSignature, Owner, ParameterList};

    // Errors
    pub use strata_core::{ParameterError, PkError, RegistryError};

    // Mesh
    pub use strata_mesh::{ColumnMesh, Mesh};

    // Registry
    pub use strata_state::{FieldData, FieldHandle, MemoryVis, State, VisSink};

    // Kernels
    pub use strata_pk::{AdvanceContext, CouplerError, ProcessKernel, WeakCoupler};

    // Engine
    pub use strata_engine::{Coordinator, CoordinatorConfig, CoordinatorError};
}
