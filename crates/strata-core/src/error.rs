//! Error types for the Strata framework.
//!
//! Organized by subsystem: the field registry (setup-time configuration
//! errors), configuration lookup, and process-kernel execution (the only
//! runtime failure mode).

use std::error::Error;
use std::fmt;

use crate::field::{FieldLocation, FieldSignature, Owner};

/// Errors from the field registry.
///
/// Registration and initialization errors are unrecoverable configuration
/// errors: they terminate setup and are never retried.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// Two requests for the same field disagree on location or dof count.
    SignatureConflict {
        /// The contested field.
        field: String,
        /// Signature presented by the failing request.
        requested: FieldSignature,
        /// Signature the field was created with.
        existing: FieldSignature,
    },
    /// Two kernels both asked to own the same field.
    DoubleOwnership {
        /// The contested field.
        field: String,
        /// The kernel that already owns it.
        owner: Owner,
        /// The kernel whose claim was rejected.
        requester: Owner,
    },
    /// Copy-assignment between registries that are not structurally identical.
    IncompatibleState {
        /// What differed.
        reason: String,
    },
    /// No field with this name has been required.
    UnknownField {
        /// The requested name.
        field: String,
    },
    /// Mutable access requested by someone other than the field's owner.
    NotOwner {
        /// The field.
        field: String,
        /// Its registered owner.
        owner: Owner,
        /// Who asked.
        requester: Owner,
    },
    /// A write capability was presented to a registry of another lineage.
    StaleCapability {
        /// The field the capability names.
        field: String,
    },
    /// Sub-field name count does not match the field's dof count.
    SubfieldCount {
        /// The field.
        field: String,
        /// The field's dof count.
        expected: usize,
        /// Number of names supplied.
        found: usize,
    },
    /// A value slice or storage block has the wrong length or shape.
    ValueCount {
        /// The field.
        field: String,
        /// Expected number of values.
        expected: usize,
        /// Number of values supplied.
        found: usize,
    },
    /// A field was required with zero degrees of freedom.
    ZeroDofs {
        /// The field.
        field: String,
    },
    /// An operation that only makes sense for some locations or shapes.
    InvalidOperation {
        /// The field.
        field: String,
        /// Why the operation was rejected.
        reason: String,
    },
    /// `require` was called after the registry was initialized.
    RegistrationClosed {
        /// The field that was requested.
        field: String,
    },
    /// `require` was called on a derived snapshot.
    DerivedSnapshot {
        /// The field that was requested.
        field: String,
    },
    /// A mesh block ID that the mesh does not define.
    UnknownBlock {
        /// The block ID.
        block_id: i64,
    },
    /// A required configuration value was missing or mistyped.
    Parameter(ParameterError),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SignatureConflict {
                field,
                requested,
                existing,
            } => write!(
                f,
                "requested field '{field}' on {requested} already exists on {existing}"
            ),
            Self::DoubleOwnership {
                field,
                owner,
                requester,
            } => write!(
                f,
                "field '{field}' requested as owned by '{requester}' is already owned by '{owner}'"
            ),
            Self::IncompatibleState { reason } => {
                write!(f, "attempted copy of non-compatible states: {reason}")
            }
            Self::UnknownField { field } => write!(f, "no field named '{field}'"),
            Self::NotOwner {
                field,
                owner,
                requester,
            } => write!(
                f,
                "'{requester}' may not write field '{field}' owned by '{owner}'"
            ),
            Self::StaleCapability { field } => {
                write!(f, "write capability for '{field}' belongs to another registry")
            }
            Self::SubfieldCount {
                field,
                expected,
                found,
            } => write!(
                f,
                "field '{field}' has {expected} dof(s) but {found} sub-field name(s) were given"
            ),
            Self::ValueCount {
                field,
                expected,
                found,
            } => write!(
                f,
                "field '{field}' expects {expected} value(s), got {found}"
            ),
            Self::ZeroDofs { field } => {
                write!(f, "field '{field}' must have at least one dof")
            }
            Self::InvalidOperation { field, reason } => {
                write!(f, "invalid operation on field '{field}': {reason}")
            }
            Self::RegistrationClosed { field } => write!(
                f,
                "cannot require field '{field}': registration closed by initialize()"
            ),
            Self::DerivedSnapshot { field } => write!(
                f,
                "cannot require field '{field}' on a derived snapshot"
            ),
            Self::UnknownBlock { block_id } => write!(f, "mesh has no block {block_id}"),
            Self::Parameter(e) => write!(f, "configuration: {e}"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parameter(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParameterError> for RegistryError {
    fn from(e: ParameterError) -> Self {
        Self::Parameter(e)
    }
}

impl RegistryError {
    /// Shorthand for a signature conflict that differs only by location.
    pub fn location_conflict(
        field: impl Into<String>,
        requested: FieldLocation,
        existing: FieldSignature,
    ) -> Self {
        Self::SignatureConflict {
            field: field.into(),
            requested: FieldSignature::new(requested, existing.num_dofs),
            existing,
        }
    }
}

/// Errors from configuration lookups.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParameterError {
    /// A required key is absent.
    Missing {
        /// The key.
        key: String,
    },
    /// A key is present with a value of the wrong type.
    TypeMismatch {
        /// The key.
        key: String,
        /// The type the caller asked for.
        expected: &'static str,
        /// The type actually stored.
        found: &'static str,
    },
    /// A required sublist is absent.
    MissingSublist {
        /// The sublist name.
        name: String,
    },
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { key } => write!(f, "missing parameter '{key}'"),
            Self::TypeMismatch {
                key,
                expected,
                found,
            } => write!(f, "parameter '{key}' is {found}, expected {expected}"),
            Self::MissingSublist { name } => write!(f, "missing sublist '{name}'"),
        }
    }
}

impl Error for ParameterError {}

/// Errors from process-kernel execution.
///
/// Returned by a kernel's `advance()`. Couplers wrap the first failing
/// sub-kernel's error in [`PkError::SubKernelFailed`] so the failure stays
/// attributable through any depth of nesting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PkError {
    /// The kernel's own step failed (e.g. a nonlinear solve diverged).
    ExecutionFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// The kernel hit a registry error while reading or writing fields.
    Registry(RegistryError),
    /// A sub-kernel of a coupler failed.
    SubKernelFailed {
        /// Position of the failing kernel in the coupler's sequence.
        index: usize,
        /// Name of the failing kernel.
        name: String,
        /// What went wrong inside it.
        source: Box<PkError>,
    },
}

impl PkError {
    /// Convenience constructor for [`PkError::ExecutionFailed`].
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::ExecutionFailed {
            reason: reason.into(),
        }
    }

    /// Names of the kernels along the failure path, outermost first.
    ///
    /// Empty if the error did not come through a coupler.
    pub fn kernel_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        let mut current = self;
        while let Self::SubKernelFailed { name, source, .. } = current {
            path.push(name.as_str());
            current = source;
        }
        path
    }
}

impl fmt::Display for PkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExecutionFailed { reason } => write!(f, "execution failed: {reason}"),
            Self::Registry(e) => write!(f, "registry: {e}"),
            Self::SubKernelFailed {
                index,
                name,
                source,
            } => write!(f, "sub-kernel {index} '{name}' failed: {source}"),
        }
    }
}

impl Error for PkError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Registry(e) => Some(e),
            Self::SubKernelFailed { source, .. } => Some(source.as_ref()),
            Self::ExecutionFailed { .. } => None,
        }
    }
}

impl From<RegistryError> for PkError {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_conflict_names_both_locations() {
        let err = RegistryError::location_conflict(
            "pressure",
            FieldLocation::Face,
            FieldSignature::new(FieldLocation::Cell, 1),
        );
        let msg = err.to_string();
        assert!(msg.contains("pressure"));
        assert!(msg.contains("face"));
        assert!(msg.contains("cell"));
    }

    #[test]
    fn kernel_path_follows_nesting() {
        let err = PkError::SubKernelFailed {
            index: 1,
            name: "surface-subsurface".into(),
            source: Box::new(PkError::SubKernelFailed {
                index: 0,
                name: "richards".into(),
                source: Box::new(PkError::failed("newton diverged")),
            }),
        };
        assert_eq!(err.kernel_path(), vec!["surface-subsurface", "richards"]);
        assert!(err.to_string().contains("newton diverged"));
    }

    #[test]
    fn registry_error_chains_parameter_source() {
        let err = RegistryError::from(ParameterError::Missing {
            key: "Gravity z".into(),
        });
        assert!(Error::source(&err).is_some());
    }
}
