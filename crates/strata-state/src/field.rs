//! The [`Field`] record: one named quantity, its signature, owner and storage.

use strata_core::{FieldId, FieldLocation, FieldSignature, Owner, RegistryError};
use strata_mesh::Mesh;

use crate::storage::FieldData;

/// A named physical quantity stored over the mesh.
///
/// The signature (location and dof count) is fixed at creation. Ownership
/// moves at most once, from [`Owner::Registry`] to a kernel. All writes are
/// funnelled through [`check_writer`](Field::check_writer), so no two call
/// sites can both act as the owner.
#[derive(Clone, Debug)]
pub struct Field {
    id: FieldId,
    name: String,
    signature: FieldSignature,
    owner: Owner,
    subfield_names: Vec<String>,
    initialized: bool,
    io_vis: bool,
    data: FieldData,
}

impl Field {
    pub(crate) fn new(
        id: FieldId,
        name: String,
        signature: FieldSignature,
        owner: Owner,
        num_entities: usize,
    ) -> Self {
        Self {
            id,
            name,
            signature,
            owner,
            subfield_names: Vec::new(),
            initialized: false,
            io_vis: true,
            data: FieldData::zeros(num_entities, signature.num_dofs),
        }
    }

    /// Registration-order identifier.
    pub fn id(&self) -> FieldId {
        self.id
    }

    /// Unique name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Location and dof count.
    pub fn signature(&self) -> FieldSignature {
        self.signature
    }

    /// Mesh entity the values live on.
    pub fn location(&self) -> FieldLocation {
        self.signature.location
    }

    /// Degrees of freedom per entity.
    pub fn num_dofs(&self) -> usize {
        self.signature.num_dofs
    }

    /// Current owner.
    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    /// Human-readable component names; empty until assigned.
    pub fn subfield_names(&self) -> &[String] {
        &self.subfield_names
    }

    /// Whether the field has received its initial condition.
    pub fn initialized(&self) -> bool {
        self.initialized
    }

    /// Whether `write_vis` emits this field.
    pub fn io_vis(&self) -> bool {
        self.io_vis
    }

    /// Read-only view of the values.
    pub fn data(&self) -> &FieldData {
        &self.data
    }

    /// Whether the sub-field names cover every dof, which is what
    /// configuration-driven initialization needs.
    pub fn has_complete_subfield_names(&self) -> bool {
        self.subfield_names.len() == self.signature.num_dofs
    }

    /// Fail unless `requester` is the registered owner.
    pub fn check_writer(&self, requester: &Owner) -> Result<(), RegistryError> {
        if &self.owner != requester {
            return Err(RegistryError::NotOwner {
                field: self.name.clone(),
                owner: self.owner.clone(),
                requester: requester.clone(),
            });
        }
        Ok(())
    }

    pub(crate) fn set_owner(&mut self, owner: Owner) {
        self.owner = owner;
    }

    pub(crate) fn set_initialized(&mut self, initialized: bool) {
        self.initialized = initialized;
    }

    pub(crate) fn set_io_vis(&mut self, io_vis: bool) {
        self.io_vis = io_vis;
    }

    pub(crate) fn data_mut(&mut self) -> &mut FieldData {
        &mut self.data
    }

    pub(crate) fn set_subfield_names(&mut self, names: Vec<String>) -> Result<(), RegistryError> {
        if names.len() != self.signature.num_dofs {
            return Err(RegistryError::SubfieldCount {
                field: self.name.clone(),
                expected: self.signature.num_dofs,
                found: names.len(),
            });
        }
        self.subfield_names = names;
        Ok(())
    }

    /// Assign `per_dof[d]` to component `d` everywhere, or only on
    /// `entities` when given.
    pub(crate) fn assign_constant(
        &mut self,
        per_dof: &[f64],
        entities: Option<&[usize]>,
    ) -> Result<(), RegistryError> {
        self.check_value_count(per_dof.len(), self.signature.num_dofs)?;
        match entities {
            Some(entities) => self.data.fill_per_dof_on(entities, per_dof),
            None => self.data.fill_per_dof(per_dof),
        }
        Ok(())
    }

    /// Store the normal flux `u · n_f` of a constant 3-vector on `faces`.
    ///
    /// Only meaningful for single-dof face fields.
    pub(crate) fn assign_face_vector(
        &mut self,
        u: [f64; 3],
        faces: &[usize],
        mesh: &dyn Mesh,
    ) -> Result<(), RegistryError> {
        if self.signature.location != FieldLocation::Face || self.signature.num_dofs != 1 {
            return Err(RegistryError::InvalidOperation {
                field: self.name.clone(),
                reason: format!(
                    "vector assignment needs a face field with 1 dof, field is {}",
                    self.signature
                ),
            });
        }
        let column = self.data.column_mut(0);
        for &f in faces {
            let n = mesh.face_normal(f);
            column[f] = u[0] * n[0] + u[1] * n[1] + u[2] * n[2];
        }
        Ok(())
    }

    /// Overwrite the values with a same-shaped block.
    pub(crate) fn assign_data(&mut self, data: &FieldData) -> Result<(), RegistryError> {
        self.check_shape(data)?;
        self.data.copy_values_from(data);
        Ok(())
    }

    /// Swap in a whole new storage block of the same shape.
    pub(crate) fn replace_data(&mut self, data: FieldData) -> Result<FieldData, RegistryError> {
        self.check_shape(&data)?;
        Ok(std::mem::replace(&mut self.data, data))
    }

    fn check_shape(&self, data: &FieldData) -> Result<(), RegistryError> {
        if !self.data.same_shape(data) {
            return Err(RegistryError::ValueCount {
                field: self.name.clone(),
                expected: self.data.as_slice().len(),
                found: data.as_slice().len(),
            });
        }
        Ok(())
    }

    fn check_value_count(&self, found: usize, expected: usize) -> Result<(), RegistryError> {
        if found != expected {
            return Err(RegistryError::ValueCount {
                field: self.name.clone(),
                expected,
                found,
            });
        }
        Ok(())
    }
}
