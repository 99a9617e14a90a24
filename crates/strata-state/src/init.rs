//! Configuration-driven initialization of registry fields.
//!
//! Independent variables are owned by the registry and get their initial
//! condition here; kernel-owned fields may be initialized here too when the
//! configuration names them and the owner has not already done so.

use std::sync::Arc;

use smallvec::SmallVec;
use strata_core::{FieldLocation, ParameterError, ParameterList, RegistryError};
use tracing::{debug, info};

use crate::registry::{block_entities, State, StateStatus};

/// Values for every sub-field of one field; most fields have few dofs.
type DofValues = SmallVec<[f64; 4]>;

impl State {
    /// Read the simulation-wide constants and assign `"Constant ..."`
    /// initial conditions from the registry's configuration.
    ///
    /// 1. `"Gravity x/y/z"` are required; `"Constant water density"` and
    ///    `"Constant viscosity"` are optional.
    /// 2. Every cell field whose sub-field names cover its dofs receives
    ///    `"Constant <sub-field>"` over the whole domain, but only when every
    ///    sub-field has a value.
    /// 3. For each `"Mesh block N"` sublist (`N` in
    ///    `1..="Number of mesh blocks"`), the same is repeated on the block's
    ///    cells, and 1-dof face fields receive
    ///    `"Constant <field> x/y/z"` projected onto the block's face normals.
    ///
    /// Fields already marked initialized when this is called (by their
    /// owning kernel) are left alone. Afterwards the field set is frozen.
    pub fn initialize(&mut self) -> Result<(), RegistryError> {
        let params = Arc::clone(&self.params);
        let mesh = Arc::clone(&self.mesh);

        self.gravity = [
            params.get_f64("Gravity x")?,
            params.get_f64("Gravity y")?,
            params.get_f64("Gravity z")?,
        ];
        info!(gravity = ?self.gravity, "gravity set from configuration");
        if let Some(density) = params.get_f64_opt("Constant water density")? {
            info!(density, "density set from configuration");
            self.density = density;
        }
        if let Some(viscosity) = params.get_f64_opt("Constant viscosity")? {
            info!(viscosity, "viscosity set from configuration");
            self.viscosity = viscosity;
        }

        let owner_initialized: Vec<bool> = self.fields.values().map(|f| f.initialized()).collect();

        // Global pass.
        for (field, &skip) in self.fields.values_mut().zip(&owner_initialized) {
            if skip
                || field.location() != FieldLocation::Cell
                || !field.has_complete_subfield_names()
            {
                continue;
            }
            if let Some(values) = subfield_constants(&params, field.subfield_names())? {
                debug!(field = field.name(), ?values, "assigning constant initial condition");
                field.assign_constant(&values, None)?;
                field.set_initialized(true);
            }
        }

        // Per-block pass.
        let num_blocks = params.get_i64_opt("Number of mesh blocks")?.unwrap_or(0);
        for nb in 1..=num_blocks {
            let block = params.sublist(&format!("Mesh block {nb}"))?;
            let block_id = block.get_i64("Mesh block ID")?;

            for (field, &skip) in self.fields.values_mut().zip(&owner_initialized) {
                if skip {
                    continue;
                }
                match field.location() {
                    FieldLocation::Cell => {
                        if !field.has_complete_subfield_names() {
                            continue;
                        }
                        if let Some(values) = subfield_constants(block, field.subfield_names())? {
                            let cells =
                                block_entities(mesh.as_ref(), block_id, FieldLocation::Cell)?;
                            debug!(
                                field = field.name(),
                                block_id,
                                ?values,
                                "assigning block constant initial condition"
                            );
                            field.assign_constant(&values, Some(cells))?;
                            field.set_initialized(true);
                        }
                    }
                    FieldLocation::Face => {
                        if field.num_dofs() != 1 {
                            continue;
                        }
                        if let Some(u) = vector_constant(block, field.name())? {
                            let faces =
                                block_entities(mesh.as_ref(), block_id, FieldLocation::Face)?;
                            debug!(
                                field = field.name(),
                                block_id,
                                ?u,
                                "assigning block vector initial condition"
                            );
                            field.assign_face_vector(u, faces, mesh.as_ref())?;
                            field.set_initialized(true);
                        }
                    }
                }
            }
        }

        self.status = StateStatus::Initialized;
        info!(
            fields = self.fields.len(),
            uninitialized = self.uninitialized_fields().len(),
            "registry initialized"
        );
        Ok(())
    }
}

/// `"Constant <name>"` for every sub-field, or `None` if any is missing.
fn subfield_constants(
    params: &ParameterList,
    names: &[String],
) -> Result<Option<DofValues>, ParameterError> {
    let mut values = DofValues::with_capacity(names.len());
    for name in names {
        match params.get_f64_opt(&format!("Constant {name}"))? {
            Some(v) => values.push(v),
            None => return Ok(None),
        }
    }
    Ok(Some(values))
}

/// `"Constant <field> x/y/z"`, or `None` unless all three are present.
fn vector_constant(
    params: &ParameterList,
    field: &str,
) -> Result<Option<[f64; 3]>, ParameterError> {
    let mut u = [0.0; 3];
    for (slot, axis) in u.iter_mut().zip(["x", "y", "z"]) {
        match params.get_f64_opt(&format!("Constant {field} {axis}"))? {
            Some(v) => *slot = v,
            None => return Ok(None),
        }
    }
    Ok(Some(u))
}
