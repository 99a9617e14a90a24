//! The core `Mesh` trait.

use crate::error::MeshError;
use std::any::Any;
use std::fmt;
use strata_core::FieldLocation;

/// Spatial domain shared by every field in a registry.
///
/// A registry holds its mesh behind an `Arc<dyn Mesh>`; derived snapshots
/// share the same instance. Field storage is sized from
/// [`num_entities`](Mesh::num_entities), block-scoped initialization uses
/// [`block_entities`](Mesh::block_entities), and face-vector assignment
/// projects onto [`face_normal`](Mesh::face_normal).
pub trait Mesh: Any + fmt::Debug + Send + Sync + 'static {
    /// Number of entities of the given kind.
    fn num_entities(&self, location: FieldLocation) -> usize;

    /// IDs of all mesh blocks, in definition order.
    fn block_ids(&self) -> Vec<i64>;

    /// Entities of the given kind belonging to a block, ascending.
    ///
    /// For faces this is every face bounding at least one cell of the block.
    fn block_entities(&self, block_id: i64, location: FieldLocation)
        -> Result<&[usize], MeshError>;

    /// Area-weighted outward normal of a face.
    fn face_normal(&self, face: usize) -> [f64; 3];
}

impl dyn Mesh {
    /// Attempt to downcast a trait object to a concrete mesh type.
    pub fn downcast_ref<T: Mesh>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }
}
