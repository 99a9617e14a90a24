//! Vertical 1-D column mesh with named blocks.

use std::ops::Range;

use indexmap::IndexMap;
use strata_core::FieldLocation;

use crate::error::MeshError;
use crate::mesh::Mesh;

/// Cells and faces belonging to one block.
#[derive(Clone, Debug)]
struct Block {
    cells: Vec<usize>,
    faces: Vec<usize>,
}

/// A vertical column of `n` stacked cells.
///
/// Cell `i` spans `[z0 + i*dz, z0 + (i+1)*dz]`. Face `i` is the bottom face
/// of cell `i`; face `n` caps the column. Every face is horizontal, so its
/// area-weighted normal is `[0, 0, area]`.
///
/// # Examples
///
/// ```
/// use strata_core::FieldLocation;
/// use strata_mesh::{ColumnMesh, Mesh};
///
/// let mesh = ColumnMesh::new(10, 0.1, 1.0)
///     .unwrap()
///     .with_block(1, 0..4)
///     .unwrap()
///     .with_block(2, 4..10)
///     .unwrap();
/// assert_eq!(mesh.num_entities(FieldLocation::Cell), 10);
/// assert_eq!(mesh.num_entities(FieldLocation::Face), 11);
/// assert_eq!(mesh.block_entities(1, FieldLocation::Face).unwrap(), &[0, 1, 2, 3, 4]);
/// ```
#[derive(Clone, Debug)]
pub struct ColumnMesh {
    cell_count: usize,
    dz: f64,
    area: f64,
    z0: f64,
    blocks: IndexMap<i64, Block>,
}

impl ColumnMesh {
    /// Create a column of `cell_count` cells of height `dz` and
    /// cross-sectional `area`, with its bottom face at `z = 0`.
    pub fn new(cell_count: usize, dz: f64, area: f64) -> Result<Self, MeshError> {
        if cell_count == 0 {
            return Err(MeshError::EmptyMesh);
        }
        check_length("dz", dz)?;
        check_length("area", area)?;
        Ok(Self {
            cell_count,
            dz,
            area,
            z0: 0.0,
            blocks: IndexMap::new(),
        })
    }

    /// Shift the column so its bottom face sits at `z0`.
    pub fn with_bottom(mut self, z0: f64) -> Self {
        self.z0 = z0;
        self
    }

    /// Define a block covering the cells in `cells`.
    pub fn with_block(mut self, block_id: i64, cells: Range<usize>) -> Result<Self, MeshError> {
        if cells.start >= cells.end || cells.end > self.cell_count {
            return Err(MeshError::BlockOutOfRange {
                block_id,
                start: cells.start,
                end: cells.end,
                cell_count: self.cell_count,
            });
        }
        if self.blocks.contains_key(&block_id) {
            return Err(MeshError::DuplicateBlock { block_id });
        }
        let faces = (cells.start..=cells.end).collect();
        self.blocks.insert(
            block_id,
            Block {
                cells: cells.collect(),
                faces,
            },
        );
        Ok(self)
    }

    /// Cell height.
    pub fn dz(&self) -> f64 {
        self.dz
    }

    /// Cross-sectional area.
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Elevation of a cell's centroid.
    pub fn cell_centroid_z(&self, cell: usize) -> f64 {
        self.z0 + (cell as f64 + 0.5) * self.dz
    }

    /// Elevation of a face.
    pub fn face_z(&self, face: usize) -> f64 {
        self.z0 + face as f64 * self.dz
    }
}

fn check_length(name: &'static str, value: f64) -> Result<(), MeshError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(MeshError::InvalidSpacing { name, value });
    }
    Ok(())
}

impl Mesh for ColumnMesh {
    fn num_entities(&self, location: FieldLocation) -> usize {
        match location {
            FieldLocation::Cell => self.cell_count,
            FieldLocation::Face => self.cell_count + 1,
        }
    }

    fn block_ids(&self) -> Vec<i64> {
        self.blocks.keys().copied().collect()
    }

    fn block_entities(
        &self,
        block_id: i64,
        location: FieldLocation,
    ) -> Result<&[usize], MeshError> {
        let block = self
            .blocks
            .get(&block_id)
            .ok_or(MeshError::UnknownBlock { block_id })?;
        Ok(match location {
            FieldLocation::Cell => &block.cells,
            FieldLocation::Face => &block.faces,
        })
    }

    fn face_normal(&self, _face: usize) -> [f64; 3] {
        [0.0, 0.0, self.area]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rejects_empty_and_bad_spacing() {
        assert_eq!(ColumnMesh::new(0, 1.0, 1.0).unwrap_err(), MeshError::EmptyMesh);
        assert!(matches!(
            ColumnMesh::new(3, 0.0, 1.0),
            Err(MeshError::InvalidSpacing { name: "dz", .. })
        ));
        assert!(matches!(
            ColumnMesh::new(3, 1.0, f64::NAN),
            Err(MeshError::InvalidSpacing { name: "area", .. })
        ));
    }

    #[test]
    fn block_validation() {
        let mesh = ColumnMesh::new(5, 1.0, 1.0).unwrap();
        assert!(matches!(
            mesh.clone().with_block(1, 3..6),
            Err(MeshError::BlockOutOfRange { block_id: 1, .. })
        ));
        assert!(matches!(
            mesh.clone().with_block(1, 2..2),
            Err(MeshError::BlockOutOfRange { .. })
        ));
        let mesh = mesh.with_block(1, 0..2).unwrap();
        assert_eq!(
            mesh.with_block(1, 2..4).unwrap_err(),
            MeshError::DuplicateBlock { block_id: 1 }
        );
    }

    #[test]
    fn unknown_block_lookup_fails() {
        let mesh = ColumnMesh::new(5, 1.0, 1.0).unwrap();
        assert_eq!(
            mesh.block_entities(9, FieldLocation::Cell).unwrap_err(),
            MeshError::UnknownBlock { block_id: 9 }
        );
    }

    #[test]
    fn geometry() {
        let mesh = ColumnMesh::new(4, 0.5, 2.0).unwrap().with_bottom(-2.0);
        assert_eq!(mesh.cell_centroid_z(0), -1.75);
        assert_eq!(mesh.face_z(4), 0.0);
        assert_eq!(mesh.face_normal(2), [0.0, 0.0, 2.0]);
    }

    #[test]
    fn block_ids_keep_definition_order() {
        let mesh = ColumnMesh::new(6, 1.0, 1.0)
            .unwrap()
            .with_block(30, 0..2)
            .unwrap()
            .with_block(10, 2..6)
            .unwrap();
        assert_eq!(mesh.block_ids(), vec![30, 10]);
    }

    proptest! {
        #[test]
        fn block_faces_bound_block_cells(n in 1usize..64, a in 0usize..64, b in 0usize..64) {
            let (start, end) = (a.min(b) % n, (a.max(b) % n) + 1);
            prop_assume!(start < end);
            let mesh = ColumnMesh::new(n, 1.0, 1.0).unwrap().with_block(7, start..end).unwrap();
            let cells = mesh.block_entities(7, FieldLocation::Cell).unwrap();
            let faces = mesh.block_entities(7, FieldLocation::Face).unwrap();
            prop_assert_eq!(cells.len(), end - start);
            prop_assert_eq!(faces.len(), cells.len() + 1);
            prop_assert!(faces.iter().all(|&f| f < mesh.num_entities(FieldLocation::Face)));
        }
    }
}
