//! Mesh and configuration fixtures.

use std::sync::Arc;

use strata_core::ParameterList;
use strata_mesh::{ColumnMesh, Mesh};

/// A unit-spaced column of `cells` cells with a single block `1` covering it.
pub fn column_mesh(cells: usize) -> Arc<dyn Mesh> {
    let mesh = ColumnMesh::new(cells, 1.0, 1.0)
        .and_then(|m| m.with_block(1, 0..cells))
        .expect("valid column");
    Arc::new(mesh)
}

/// A unit-spaced column split into block `1` (`0..split`) and block `2`
/// (`split..cells`).
pub fn two_block_column(cells: usize, split: usize) -> Arc<dyn Mesh> {
    let mesh = ColumnMesh::new(cells, 1.0, 1.0)
        .and_then(|m| m.with_block(1, 0..split))
        .and_then(|m| m.with_block(2, split..cells))
        .expect("valid column");
    Arc::new(mesh)
}

/// Configuration with earth gravity pointing down `z` and nothing else.
pub fn gravity_params() -> ParameterList {
    ParameterList::new()
        .with_f64("Gravity x", 0.0)
        .with_f64("Gravity y", 0.0)
        .with_f64("Gravity z", -9.80665)
}
