//! End-to-end runs of the coordinator over the shared test kernels.

use strata_core::{ParameterList, RegistryError};
use strata_engine::{Coordinator, CoordinatorConfig, CoordinatorError};
use strata_pk::{ProcessKernel, WeakCoupler};
use strata_state::{MemoryVis, State};
use strata_test_utils::{
    column_mesh, gravity_params, CallLog, FailingKernel, RateKernel, RecordingKernel,
};

fn boxed(pk: impl ProcessKernel) -> Box<dyn ProcessKernel> {
    Box::new(pk)
}

fn warm_state() -> State {
    State::with_params(
        column_mesh(3),
        gravity_params().with_f64("Constant temperature", 270.0),
    )
}

#[test]
fn rate_kernel_integrates_to_end_time() {
    let pk = boxed(RateKernel::new("energy", "temperature", 2.0));
    let mut coord =
        Coordinator::new(pk, warm_state(), CoordinatorConfig::new(10.0, 1.0)).unwrap();
    let mut vis = MemoryVis::every(5);

    let summary = coord.run(&mut vis).unwrap();

    assert_eq!(summary.steps, 10);
    assert_eq!(summary.cycle, 10);
    assert_eq!(summary.failed_attempts, 0);
    assert_eq!(coord.state().field("temperature").unwrap().as_slice(), &[290.0; 3]);
    let cycles: Vec<u64> = vis.steps().iter().map(|s| s.cycle).collect();
    assert_eq!(cycles, vec![0, 5, 10]);
}

#[test]
fn failed_steps_never_reach_the_committed_state() {
    let failing = FailingKernel::new("snow", 3).writing("snow_depth");
    let pk = WeakCoupler::new(
        "surface",
        vec![boxed(RateKernel::new("energy", "temperature", 2.0)), boxed(failing)],
    )
    .unwrap();
    let mut config = CoordinatorConfig::new(10.0, 1.0);
    config.max_consecutive_failures = 4;
    let mut coord = Coordinator::new(boxed(pk), warm_state(), config).unwrap();

    let err = coord.run(&mut MemoryVis::disabled()).unwrap_err();

    assert!(matches!(
        err,
        CoordinatorError::TooManyFailures { count: 5, .. }
    ));
    let state = coord.state();
    assert_eq!(state.cycle(), 3);
    assert_eq!(state.time(), 3.0);
    assert_eq!(state.field("temperature").unwrap().as_slice(), &[276.0; 3]);
    assert_eq!(state.field("snow_depth").unwrap().as_slice(), &[2.0; 3]);
    assert_eq!(coord.total_failures(), 5);
}

#[test]
fn commit_follows_every_accepted_step() {
    let log = CallLog::new();
    let pk = WeakCoupler::new(
        "pm",
        vec![
            boxed(RecordingKernel::new("flow", &log)),
            boxed(FailingKernel::new("energy", 1).logging(&log)),
        ],
    )
    .unwrap();
    let mut config = CoordinatorConfig::new(10.0, 1.0);
    config.max_consecutive_failures = 0;
    let state = State::with_params(column_mesh(2), gravity_params());
    let mut coord = Coordinator::new(boxed(pk), state, config).unwrap();

    coord.step(&mut MemoryVis::disabled()).unwrap();
    assert!(coord.step(&mut MemoryVis::disabled()).is_err());

    let calls: Vec<String> = log
        .entries()
        .into_iter()
        .filter(|e| e.ends_with(":advance") || e.ends_with(":commit"))
        .collect();
    assert_eq!(
        calls,
        vec![
            "flow:advance",
            "energy:advance",
            "flow:commit",
            "energy:commit",
            "flow:advance",
            "energy:advance",
        ]
    );
}

#[test]
fn missing_initial_condition_is_reported() {
    let pk = boxed(RateKernel::new("energy", "temperature", 1.0));
    let state = State::with_params(column_mesh(3), gravity_params());
    let err = Coordinator::new(pk, state, CoordinatorConfig::new(1.0, 1.0)).unwrap_err();
    assert_eq!(
        err,
        CoordinatorError::Uninitialized {
            fields: vec!["temperature".into()]
        }
    );
}

#[test]
fn double_ownership_stops_setup() {
    let pk = WeakCoupler::new(
        "pm",
        vec![
            boxed(RateKernel::new("energy", "temperature", 1.0)),
            boxed(RateKernel::new("thermal", "temperature", 1.0)),
        ],
    )
    .unwrap();
    let err = Coordinator::new(boxed(pk), warm_state(), CoordinatorConfig::new(1.0, 1.0))
        .unwrap_err();
    match err {
        CoordinatorError::Registry(RegistryError::DoubleOwnership { field, .. }) => {
            assert_eq!(field, "temperature");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn kernel_max_dt_and_end_cycle_limit_the_run() {
    let log = CallLog::new();
    let pk = boxed(RecordingKernel::new("flow", &log).with_max_dt(0.5));
    let mut config = CoordinatorConfig::new(100.0, 10.0);
    config.end_cycle = Some(4);
    let state = State::with_params(column_mesh(2), gravity_params());
    let mut coord = Coordinator::new(pk, state, config).unwrap();

    let summary = coord.run(&mut MemoryVis::disabled()).unwrap();

    assert_eq!(summary.steps, 4);
    assert_eq!(summary.time, 2.0);
}

#[test]
fn built_from_one_parameter_list() {
    let params = gravity_params()
        .with_f64("Constant temperature", 250.0)
        .with_list(
            "Coordinator",
            ParameterList::new()
                .with_f64("Start time", 100.0)
                .with_f64("End time", 104.0)
                .with_f64("Initial time step", 2.0),
        );
    let pk = boxed(RateKernel::new("energy", "temperature", 0.5));
    let mut coord = Coordinator::from_params(pk, column_mesh(2), params).unwrap();

    let summary = coord.run(&mut MemoryVis::disabled()).unwrap();

    assert_eq!(summary.steps, 2);
    assert_eq!(summary.time, 104.0);
    assert_eq!(coord.state().field("temperature").unwrap().as_slice(), &[252.0; 2]);
}
