//! Mesh capability for Strata simulations.
//!
//! The registry treats the mesh as an opaque provider of entity counts,
//! mesh blocks and face geometry; the [`Mesh`] trait is that boundary.
//! Parallel decomposition lives behind it and is invisible here.
//!
//! # Backends
//!
//! - [`ColumnMesh`]: a vertical 1-D column of cells with named blocks,
//!   the standard geometry for permafrost column studies.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod column;
pub mod error;
pub mod mesh;

pub use column::ColumnMesh;
pub use error::MeshError;
pub use mesh::Mesh;
