//! Field locations, signatures and ownership.

use std::fmt;

/// Mesh entity on which a field's values live.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldLocation {
    /// One value per dof at each cell centroid.
    Cell,
    /// One value per dof on each face.
    Face,
}

impl fmt::Display for FieldLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cell => write!(f, "cell"),
            Self::Face => write!(f, "face"),
        }
    }
}

/// The permanent shape of a field: where it lives and how many
/// degrees of freedom it stores per entity.
///
/// Fixed by the first `require` call for a name. Every later request for
/// the same name must present an identical signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FieldSignature {
    /// Mesh entity the values are attached to.
    pub location: FieldLocation,
    /// Degrees of freedom per entity.
    pub num_dofs: usize,
}

impl FieldSignature {
    /// Construct a signature.
    pub fn new(location: FieldLocation, num_dofs: usize) -> Self {
        Self { location, num_dofs }
    }
}

impl fmt::Display for FieldSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} with {} dof(s)", self.location, self.num_dofs)
    }
}

/// Who may write a field.
///
/// A field is either still owned by the registry itself (declared as a
/// dependency but not yet claimed by any kernel, or an independent
/// variable initialized from configuration) or owned by exactly one
/// process kernel.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Owner {
    /// The registry sentinel: declared but unclaimed.
    Registry,
    /// A process kernel, identified by its name.
    Kernel(String),
}

impl Owner {
    /// Owner for the process kernel called `name`.
    pub fn kernel(name: impl Into<String>) -> Self {
        Self::Kernel(name.into())
    }

    /// Whether this is the registry sentinel.
    pub fn is_registry(&self) -> bool {
        matches!(self, Self::Registry)
    }

    /// Whether this owner is the kernel called `name`.
    pub fn is_kernel(&self, name: &str) -> bool {
        matches!(self, Self::Kernel(n) if n == name)
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registry => write!(f, "<registry>"),
            Self::Kernel(name) => write!(f, "{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_named_like_sentinel_is_still_a_kernel() {
        let owner = Owner::kernel("<registry>");
        assert!(!owner.is_registry());
        assert_ne!(owner, Owner::Registry);
    }

    #[test]
    fn signature_display_names_location_and_dofs() {
        let sig = FieldSignature::new(FieldLocation::Face, 1);
        assert_eq!(sig.to_string(), "face with 1 dof(s)");
    }
}
