//! Error types for mesh construction and queries.

use std::fmt;

/// Errors arising from mesh construction or block lookups.
#[derive(Clone, Debug, PartialEq)]
pub enum MeshError {
    /// Attempted to construct a mesh with zero cells.
    EmptyMesh,
    /// A geometric length was non-finite or non-positive.
    InvalidSpacing {
        /// Which length.
        name: &'static str,
        /// The offending value.
        value: f64,
    },
    /// A block's cell range is empty or extends past the last cell.
    BlockOutOfRange {
        /// The block ID.
        block_id: i64,
        /// First cell of the requested range.
        start: usize,
        /// One past the last cell of the requested range.
        end: usize,
        /// Number of cells in the mesh.
        cell_count: usize,
    },
    /// The same block ID was defined twice.
    DuplicateBlock {
        /// The block ID.
        block_id: i64,
    },
    /// A query named a block the mesh does not define.
    UnknownBlock {
        /// The block ID.
        block_id: i64,
    },
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyMesh => write!(f, "mesh must have at least one cell"),
            Self::InvalidSpacing { name, value } => {
                write!(f, "{name} must be finite and positive, got {value}")
            }
            Self::BlockOutOfRange {
                block_id,
                start,
                end,
                cell_count,
            } => write!(
                f,
                "block {block_id} covers cells [{start}, {end}) outside [0, {cell_count})"
            ),
            Self::DuplicateBlock { block_id } => write!(f, "block {block_id} defined twice"),
            Self::UnknownBlock { block_id } => write!(f, "mesh has no block {block_id}"),
        }
    }
}

impl std::error::Error for MeshError {}
