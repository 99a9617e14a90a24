//! Configuration-driven initialization scenarios.

use strata_core::{FieldLocation, Owner, ParameterList};
use strata_state::State;
use strata_test_utils::{gravity_params, two_block_column};

#[test]
fn registry_owned_pressure_from_a_global_constant() {
    let mut state = State::with_params(
        two_block_column(4, 2),
        gravity_params().with_f64("Constant pressure", 101325.0),
    );
    let _ = state
        .require_field("pressure", FieldLocation::Cell, Owner::Registry, 1)
        .unwrap();
    state
        .set_subfield_names("pressure", vec!["pressure".into()])
        .unwrap();

    state.initialize().unwrap();

    assert!(state.check_all_initialized());
    assert_eq!(state.field("pressure").unwrap().as_slice(), &[101325.0; 4]);
}

#[test]
fn block_values_override_global_ones() {
    let params = gravity_params()
        .with_f64("Constant temperature", 265.0)
        .with_i64("Number of mesh blocks", 1)
        .with_list(
            "Mesh block 1",
            ParameterList::new()
                .with_i64("Mesh block ID", 2)
                .with_f64("Constant temperature", 272.0),
        );
    let mut state = State::with_params(two_block_column(4, 1), params);
    let _ = state
        .require_field("temperature", FieldLocation::Cell, Owner::Registry, 1)
        .unwrap();
    state
        .set_subfield_names("temperature", vec!["temperature".into()])
        .unwrap();

    state.initialize().unwrap();

    assert_eq!(
        state.field("temperature").unwrap().as_slice(),
        &[265.0, 272.0, 272.0, 272.0]
    );
}

#[test]
fn face_vector_from_block_constants() {
    let params = gravity_params().with_i64("Number of mesh blocks", 1).with_list(
        "Mesh block 1",
        ParameterList::new()
            .with_i64("Mesh block ID", 1)
            .with_f64("Constant darcy_flux x", 3.0)
            .with_f64("Constant darcy_flux y", 0.0)
            .with_f64("Constant darcy_flux z", -1.5),
    );
    let mut state = State::with_params(two_block_column(4, 2), params);
    let _ = state
        .require_field("darcy_flux", FieldLocation::Face, Owner::Registry, 1)
        .unwrap();

    state.initialize().unwrap();

    // Block 1 holds cells 0..2 and therefore faces 0..=2; unit area, +z normals.
    assert_eq!(
        state.field("darcy_flux").unwrap().as_slice(),
        &[-1.5, -1.5, -1.5, 0.0, 0.0]
    );
    assert!(state.record("darcy_flux").unwrap().initialized());
}

#[test]
fn uninitialized_fields_are_listed() {
    let mut state = State::with_params(two_block_column(4, 2), gravity_params());
    let _ = state
        .require_field("saturation_liquid", FieldLocation::Cell, Owner::Registry, 1)
        .unwrap();
    let _ = state
        .require_field("temperature", FieldLocation::Cell, Owner::kernel("energy"), 1)
        .unwrap();

    state.initialize().unwrap();

    assert!(!state.check_all_initialized());
    assert_eq!(
        state.uninitialized_fields(),
        vec!["saturation_liquid", "temperature"]
    );
}
