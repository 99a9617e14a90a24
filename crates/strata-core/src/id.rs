//! Strongly-typed identifiers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies a field within a registry.
///
/// Fields are assigned sequential IDs in registration order. `FieldId(n)`
/// is the n-th field ever required on the primary registry, and it stays
/// valid on every snapshot derived from that registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(pub u32);

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for FieldId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Counter for unique [`LineageId`] allocation.
static LINEAGE_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Identifies a family of registries that share structure.
///
/// Every primary registry allocates a fresh lineage; snapshots derived
/// from it inherit the same value. Two registries with equal lineage
/// have identical field ordering and signatures, which is what the
/// copy-assignment fast path and write capabilities rely on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineageId(u64);

impl LineageId {
    /// Allocate a fresh, unique lineage ID. Thread-safe.
    pub fn next() -> Self {
        Self(LINEAGE_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for LineageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lineage_ids_are_unique() {
        let a = LineageId::next();
        let b = LineageId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn field_id_display() {
        assert_eq!(FieldId(7).to_string(), "7");
        assert_eq!(FieldId::from(3), FieldId(3));
    }
}
