//! Core types for the Strata multiphysics framework.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! vocabulary shared by the registry, the process kernels and the driver:
//! field identifiers and signatures, the owner sentinel, the configuration
//! parameter list, and the error taxonomy.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod field;
pub mod id;
pub mod params;

pub use error::{ParameterError, PkError, RegistryError};
pub use field::{FieldLocation, FieldSignature, Owner};
pub use id::{FieldId, LineageId};
pub use params::{ParamValue, ParameterList};
