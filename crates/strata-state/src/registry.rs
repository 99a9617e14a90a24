//! The [`State`] registry: field ownership arbitration, access and snapshots.
//!
//! One primary `State` is populated through [`State::require_field`] during
//! setup. Every other registry in a run (trial states, stage states) comes
//! from [`State::derive_snapshot`] and is refreshed with
//! [`State::assign_from`], which relies on the shared structure.

use std::sync::Arc;

use indexmap::IndexMap;
use strata_core::{
    FieldId, FieldLocation, FieldSignature, LineageId, Owner, ParameterList, RegistryError,
};
use strata_mesh::Mesh;

use crate::field::Field;
use crate::storage::FieldData;

/// Proof that the holder owns a field.
///
/// Minted only by [`State::require_field`] when the call creates or claims
/// ownership. Valid on the issuing registry and on every snapshot that
/// shares its lineage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteCapability {
    id: FieldId,
    field: String,
    owner: Owner,
    lineage: LineageId,
}

impl WriteCapability {
    /// The field this capability grants write access to.
    pub fn field_id(&self) -> FieldId {
        self.id
    }

    /// Name of that field.
    pub fn field_name(&self) -> &str {
        &self.field
    }

    /// The owner the capability was issued to.
    pub fn owner(&self) -> &Owner {
        &self.owner
    }
}

/// Result of a successful [`State::require_field`] call.
#[derive(Clone, Debug)]
#[must_use]
pub struct FieldHandle {
    /// Registration-order ID of the field.
    pub id: FieldId,
    /// Present iff this call made the requester the owner.
    pub capability: Option<WriteCapability>,
}

/// Lifecycle of a registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateStatus {
    /// Accepting `require` calls.
    Setup,
    /// `initialize()` has run; the field set is frozen.
    Initialized,
}

/// The shared field store for one simulation snapshot.
///
/// Holds every [`Field`] in registration order, the simulation-wide
/// constants (density, viscosity, gravity), the current time and cycle,
/// and the configuration used by [`State::initialize`].
///
/// `State` is not `Clone`: independent copies come from
/// [`derive_snapshot`](State::derive_snapshot), which marks the result as
/// structurally tied to its ancestor.
#[derive(Debug)]
pub struct State {
    pub(crate) mesh: Arc<dyn Mesh>,
    pub(crate) params: Arc<ParameterList>,
    lineage: LineageId,
    primary: bool,
    pub(crate) fields: IndexMap<String, Field>,
    pub(crate) density: f64,
    pub(crate) viscosity: f64,
    pub(crate) gravity: [f64; 3],
    time: f64,
    cycle: u64,
    pub(crate) status: StateStatus,
}

impl State {
    /// Create an empty primary registry with no configuration.
    pub fn new(mesh: Arc<dyn Mesh>) -> Self {
        Self::with_params(mesh, ParameterList::new())
    }

    /// Create an empty primary registry that initializes from `params`.
    pub fn with_params(mesh: Arc<dyn Mesh>, params: ParameterList) -> Self {
        Self {
            mesh,
            params: Arc::new(params),
            lineage: LineageId::next(),
            primary: true,
            fields: IndexMap::new(),
            density: 0.0,
            viscosity: 0.0,
            gravity: [0.0; 3],
            time: 0.0,
            cycle: 0,
            status: StateStatus::Setup,
        }
    }

    // ── Registration ─────────────────────────────────────────────

    /// Declare a dependency on a field, optionally claiming ownership.
    ///
    /// - Unknown name: the field is created with this signature and owner.
    /// - Registry-owned field: the signature must match; ownership moves
    ///   to `owner`.
    /// - Kernel-owned field, `owner` is [`Owner::Registry`]: a read-only
    ///   dependency; the signature must match.
    /// - Kernel-owned field, `owner` is a kernel: double ownership, whatever
    ///   the signature.
    ///
    /// The returned handle carries a [`WriteCapability`] exactly when the
    /// requester ends up as a kernel owner because of this call.
    pub fn require_field(
        &mut self,
        name: &str,
        location: FieldLocation,
        owner: Owner,
        num_dofs: usize,
    ) -> Result<FieldHandle, RegistryError> {
        if !self.primary {
            return Err(RegistryError::DerivedSnapshot {
                field: name.to_string(),
            });
        }
        if self.status != StateStatus::Setup {
            return Err(RegistryError::RegistrationClosed {
                field: name.to_string(),
            });
        }
        if num_dofs == 0 {
            return Err(RegistryError::ZeroDofs {
                field: name.to_string(),
            });
        }
        let requested = FieldSignature::new(location, num_dofs);
        let lineage = self.lineage;

        let Some(field) = self.fields.get_mut(name) else {
            let id = FieldId(self.fields.len() as u32);
            let num_entities = self.mesh.num_entities(location);
            let capability = mint(id, name, &owner, lineage);
            self.fields.insert(
                name.to_string(),
                Field::new(id, name.to_string(), requested, owner, num_entities),
            );
            return Ok(FieldHandle { id, capability });
        };

        if let (Owner::Kernel(_), Owner::Kernel(_)) = (field.owner(), &owner) {
            return Err(RegistryError::DoubleOwnership {
                field: name.to_string(),
                owner: field.owner().clone(),
                requester: owner,
            });
        }
        if field.signature() != requested {
            return Err(RegistryError::SignatureConflict {
                field: name.to_string(),
                requested,
                existing: field.signature(),
            });
        }
        let id = field.id();
        if field.owner().is_registry() {
            let capability = mint(id, name, &owner, lineage);
            field.set_owner(owner);
            return Ok(FieldHandle { id, capability });
        }
        Ok(FieldHandle {
            id,
            capability: None,
        })
    }

    // ── Read access ──────────────────────────────────────────────

    /// Read-only values of a field. Available to everyone.
    pub fn field(&self, name: &str) -> Result<&FieldData, RegistryError> {
        self.record(name).map(Field::data)
    }

    /// The full field record (signature, owner, flags, values).
    pub fn record(&self, name: &str) -> Result<&Field, RegistryError> {
        self.fields.get(name).ok_or_else(|| unknown(name))
    }

    /// Field record by registration ID.
    pub fn record_by_id(&self, id: FieldId) -> Option<&Field> {
        self.fields.get_index(id.0 as usize).map(|(_, f)| f)
    }

    /// Whether a field with this name exists.
    pub fn contains_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// All field records in registration order.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no field has been required yet.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    // ── Write access ─────────────────────────────────────────────

    /// Mutable values of a field, granted only to its owner.
    pub fn field_mut(
        &mut self,
        name: &str,
        owner: &Owner,
    ) -> Result<&mut FieldData, RegistryError> {
        self.writable(name, owner).map(Field::data_mut)
    }

    /// Mutable values of a field, authorized by a capability.
    pub fn field_mut_with(
        &mut self,
        capability: &WriteCapability,
    ) -> Result<&mut FieldData, RegistryError> {
        if capability.lineage != self.lineage {
            return Err(RegistryError::StaleCapability {
                field: capability.field.clone(),
            });
        }
        self.writable(&capability.field, &capability.owner)
            .map(Field::data_mut)
    }

    /// Overwrite a field's values with a same-shaped block.
    pub fn set_field(
        &mut self,
        name: &str,
        owner: &Owner,
        data: &FieldData,
    ) -> Result<(), RegistryError> {
        self.writable(name, owner)?.assign_data(data)
    }

    /// Set component `d` of every entity to `per_dof[d]`.
    pub fn set_field_constant(
        &mut self,
        name: &str,
        owner: &Owner,
        per_dof: &[f64],
    ) -> Result<(), RegistryError> {
        self.writable(name, owner)?.assign_constant(per_dof, None)
    }

    /// Like [`set_field_constant`](Self::set_field_constant), restricted to
    /// the entities of one mesh block.
    pub fn set_field_constant_on_block(
        &mut self,
        name: &str,
        owner: &Owner,
        per_dof: &[f64],
        block_id: i64,
    ) -> Result<(), RegistryError> {
        let mesh = Arc::clone(&self.mesh);
        let field = self.writable(name, owner)?;
        let entities = block_entities(mesh.as_ref(), block_id, field.location())?;
        field.assign_constant(per_dof, Some(entities))
    }

    /// Store `u · n_f` on every face `f` of a block, for a 1-dof face field.
    pub fn set_vector_field(
        &mut self,
        name: &str,
        owner: &Owner,
        u: [f64; 3],
        block_id: i64,
    ) -> Result<(), RegistryError> {
        let mesh = Arc::clone(&self.mesh);
        let field = self.writable(name, owner)?;
        let faces = block_entities(mesh.as_ref(), block_id, FieldLocation::Face)?;
        field.assign_face_vector(u, faces, mesh.as_ref())
    }

    /// Substitute a field's storage, returning the previous block.
    pub fn replace_field_data(
        &mut self,
        name: &str,
        owner: &Owner,
        data: FieldData,
    ) -> Result<FieldData, RegistryError> {
        self.writable(name, owner)?.replace_data(data)
    }

    /// Record that the owner has supplied the field's initial condition.
    pub fn mark_initialized(&mut self, name: &str, owner: &Owner) -> Result<(), RegistryError> {
        self.writable(name, owner)?.set_initialized(true);
        Ok(())
    }

    /// Name the field's components. The count must equal its dof count.
    pub fn set_subfield_names(
        &mut self,
        name: &str,
        names: Vec<String>,
    ) -> Result<(), RegistryError> {
        self.record_mut(name)?.set_subfield_names(names)
    }

    /// Include or exclude a field from visualization output.
    pub fn set_io_vis(&mut self, name: &str, io_vis: bool) -> Result<(), RegistryError> {
        self.record_mut(name)?.set_io_vis(io_vis);
        Ok(())
    }

    // ── Simulation-wide constants ────────────────────────────────

    /// Reference water density.
    pub fn density(&self) -> f64 {
        self.density
    }

    /// Set the reference water density.
    pub fn set_density(&mut self, density: f64) {
        self.density = density;
    }

    /// Reference dynamic viscosity.
    pub fn viscosity(&self) -> f64 {
        self.viscosity
    }

    /// Set the reference dynamic viscosity.
    pub fn set_viscosity(&mut self, viscosity: f64) {
        self.viscosity = viscosity;
    }

    /// Gravity vector.
    pub fn gravity(&self) -> [f64; 3] {
        self.gravity
    }

    /// Set the gravity vector.
    pub fn set_gravity(&mut self, gravity: [f64; 3]) {
        self.gravity = gravity;
    }

    // ── Time, cycle, status ──────────────────────────────────────

    /// Current simulation time.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Set the simulation time.
    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    /// Current step counter.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Set the step counter.
    pub fn set_cycle(&mut self, cycle: u64) {
        self.cycle = cycle;
    }

    /// Lifecycle status.
    pub fn status(&self) -> StateStatus {
        self.status
    }

    /// The mesh shared by every field.
    pub fn mesh(&self) -> &Arc<dyn Mesh> {
        &self.mesh
    }

    /// Configuration consumed by [`initialize`](Self::initialize).
    pub fn params(&self) -> &ParameterList {
        &self.params
    }

    /// Structural family of this registry.
    pub fn lineage(&self) -> LineageId {
        self.lineage
    }

    /// Whether this is the registry fields were required on.
    pub fn is_primary(&self) -> bool {
        self.primary
    }

    // ── Initialization checks ────────────────────────────────────

    /// True iff every field has been initialized.
    pub fn check_all_initialized(&self) -> bool {
        self.fields.values().all(Field::initialized)
    }

    /// Names of fields still lacking an initial condition.
    pub fn uninitialized_fields(&self) -> Vec<&str> {
        self.fields
            .values()
            .filter(|f| !f.initialized())
            .map(Field::name)
            .collect()
    }

    // ── Snapshots ────────────────────────────────────────────────

    /// Deep-copy this registry into an independent, structurally linked
    /// snapshot.
    ///
    /// The snapshot has the same fields in the same order with their own
    /// storage, the same constants, time, cycle and status, and the same
    /// lineage. It cannot register new fields.
    pub fn derive_snapshot(&self) -> State {
        State {
            mesh: Arc::clone(&self.mesh),
            params: Arc::clone(&self.params),
            lineage: self.lineage,
            primary: false,
            fields: self.fields.clone(),
            density: self.density,
            viscosity: self.viscosity,
            gravity: self.gravity,
            time: self.time,
            cycle: self.cycle,
            status: self.status,
        }
    }

    /// Copy every value from a structurally identical registry.
    ///
    /// Copies field values and initialized flags, the constants, time,
    /// cycle and status. The field set and its order are never changed.
    /// Fails with [`RegistryError::IncompatibleState`], leaving `self`
    /// untouched, if the field counts, names or signatures differ.
    pub fn assign_from(&mut self, other: &State) -> Result<(), RegistryError> {
        if std::ptr::eq(self, other) {
            return Ok(());
        }
        if self.fields.len() != other.fields.len() {
            return Err(RegistryError::IncompatibleState {
                reason: format!(
                    "target has {} field(s), source has {}",
                    self.fields.len(),
                    other.fields.len()
                ),
            });
        }
        for (mine, theirs) in self.fields.values().zip(other.fields.values()) {
            if mine.name() != theirs.name()
                || mine.signature() != theirs.signature()
                || !mine.data().same_shape(theirs.data())
            {
                return Err(RegistryError::IncompatibleState {
                    reason: format!(
                        "field {} is '{}' ({}) in target but '{}' ({}) in source",
                        mine.id(),
                        mine.name(),
                        mine.signature(),
                        theirs.name(),
                        theirs.signature()
                    ),
                });
            }
        }

        for (mine, theirs) in self.fields.values_mut().zip(other.fields.values()) {
            mine.assign_data(theirs.data())?;
            mine.set_initialized(theirs.initialized());
        }
        self.density = other.density;
        self.viscosity = other.viscosity;
        self.gravity = other.gravity;
        self.time = other.time;
        self.cycle = other.cycle;
        self.status = other.status;
        Ok(())
    }

    // ── Internals ────────────────────────────────────────────────

    pub(crate) fn record_mut(&mut self, name: &str) -> Result<&mut Field, RegistryError> {
        self.fields.get_mut(name).ok_or_else(|| unknown(name))
    }

    fn writable(&mut self, name: &str, owner: &Owner) -> Result<&mut Field, RegistryError> {
        let field = self.record_mut(name)?;
        field.check_writer(owner)?;
        Ok(field)
    }
}

pub(crate) fn block_entities(
    mesh: &dyn Mesh,
    block_id: i64,
    location: FieldLocation,
) -> Result<&[usize], RegistryError> {
    mesh.block_entities(block_id, location)
        .map_err(|_| RegistryError::UnknownBlock { block_id })
}

fn mint(id: FieldId, name: &str, owner: &Owner, lineage: LineageId) -> Option<WriteCapability> {
    match owner {
        Owner::Registry => None,
        Owner::Kernel(_) => Some(WriteCapability {
            id,
            field: name.to_string(),
            owner: owner.clone(),
            lineage,
        }),
    }
}

fn unknown(name: &str) -> RegistryError {
    RegistryError::UnknownField {
        field: name.to_string(),
    }
}
