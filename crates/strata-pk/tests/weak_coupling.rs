//! Weak coupler behaviour against the shared test kernels.

use std::sync::atomic::Ordering;

use strata_core::{FieldLocation, Owner, PkError, RegistryError};
use strata_pk::{AdvanceContext, ProcessKernel, WeakCoupler};
use strata_state::State;
use strata_test_utils::{
    column_mesh, gravity_params, CallLog, ConstantKernel, FailingKernel, RecordingKernel,
};

fn boxed(pk: impl ProcessKernel) -> Box<dyn ProcessKernel> {
    Box::new(pk)
}

fn ready_state(coupler: &mut WeakCoupler) -> State {
    let mut state = State::with_params(column_mesh(4), gravity_params());
    coupler.setup(&mut state).unwrap();
    coupler.initialize(&mut state).unwrap();
    state.initialize().unwrap();
    state
}

#[test]
fn failure_in_the_middle_skips_the_rest() {
    let log = CallLog::new();
    let failing = FailingKernel::new("k2", 0).logging(&log);
    let k2_calls = failing.counter();
    let mut weak = WeakCoupler::new(
        "pm",
        vec![
            boxed(RecordingKernel::new("k1", &log)),
            boxed(failing),
            boxed(RecordingKernel::new("k3", &log)),
        ],
    )
    .unwrap();

    let committed = ready_state(&mut weak);
    let mut trial = committed.derive_snapshot();
    let mut ctx = AdvanceContext::new(&committed, &mut trial, 1.0);
    let err = weak.advance(&mut ctx).unwrap_err();

    assert_eq!(log.kernels_for("advance"), vec!["k1", "k2"]);
    assert_eq!(k2_calls.load(Ordering::Relaxed), 1);
    match err {
        PkError::SubKernelFailed {
            index,
            name,
            source,
        } => {
            assert_eq!(index, 1);
            assert_eq!(name, "k2");
            assert!(matches!(*source, PkError::ExecutionFailed { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn lifecycle_calls_follow_composition_order() {
    let log = CallLog::new();
    let mut weak = WeakCoupler::new(
        "pm",
        vec![
            boxed(RecordingKernel::new("flow", &log)),
            boxed(RecordingKernel::new("energy", &log)),
        ],
    )
    .unwrap();

    let committed = ready_state(&mut weak);
    let mut trial = committed.derive_snapshot();
    {
        let mut ctx = AdvanceContext::new(&committed, &mut trial, 1.0);
        weak.advance(&mut ctx).unwrap();
    }
    weak.commit(1.0, &trial);

    assert_eq!(
        log.entries(),
        vec![
            "flow:setup",
            "energy:setup",
            "flow:initialize",
            "energy:initialize",
            "flow:advance",
            "energy:advance",
            "flow:commit",
            "energy:commit",
        ]
    );
}

#[test]
fn later_kernels_see_earlier_writes() {
    struct Doubler;

    impl ProcessKernel for Doubler {
        fn name(&self) -> &str {
            "doubler"
        }
        fn setup(&mut self, state: &mut State) -> Result<(), RegistryError> {
            let _ = state.require_field(
                "doubled",
                FieldLocation::Cell,
                Owner::kernel("doubler"),
                1,
            )?;
            Ok(())
        }
        fn initialize(&mut self, state: &mut State) -> Result<(), RegistryError> {
            state.mark_initialized("doubled", &Owner::kernel("doubler"))
        }
        fn advance(&mut self, ctx: &mut AdvanceContext<'_>) -> Result<(), PkError> {
            let source = ctx.state().field("temperature")?.as_slice()[0];
            ctx.state_mut().set_field_constant(
                "doubled",
                &Owner::kernel("doubler"),
                &[2.0 * source],
            )?;
            Ok(())
        }
    }

    let mut weak = WeakCoupler::new(
        "pm",
        vec![
            boxed(ConstantKernel::new("energy", "temperature", 5.0)),
            boxed(Doubler),
        ],
    )
    .unwrap();
    let mut committed = ready_state(&mut weak);
    committed
        .set_field_constant("temperature", &Owner::kernel("energy"), &[1.0])
        .unwrap();
    let mut trial = committed.derive_snapshot();

    let mut ctx = AdvanceContext::new(&committed, &mut trial, 1.0);
    weak.advance(&mut ctx).unwrap();
    assert_eq!(trial.field("doubled").unwrap().as_slice(), &[10.0; 4]);
}

#[test]
fn max_dt_is_the_tightest_constraint() {
    let log = CallLog::new();
    let weak = WeakCoupler::new(
        "pm",
        vec![
            boxed(RecordingKernel::new("flow", &log).with_max_dt(3600.0)),
            boxed(RecordingKernel::new("energy", &log)),
            boxed(RecordingKernel::new("snow", &log).with_max_dt(600.0)),
        ],
    )
    .unwrap();
    assert_eq!(weak.max_dt(), Some(600.0));
}

#[test]
fn nested_couplers_report_the_full_path() {
    let log = CallLog::new();
    let inner = WeakCoupler::new(
        "subsurface",
        vec![
            boxed(RecordingKernel::new("flow", &log)),
            boxed(FailingKernel::new("energy", 0)),
        ],
    )
    .unwrap();
    let mut outer = WeakCoupler::new(
        "cycle",
        vec![boxed(inner), boxed(RecordingKernel::new("surface", &log))],
    )
    .unwrap();

    let committed = ready_state(&mut outer);
    let mut trial = committed.derive_snapshot();
    let mut ctx = AdvanceContext::new(&committed, &mut trial, 1.0);
    let err = outer.advance(&mut ctx).unwrap_err();

    assert_eq!(err.kernel_path(), vec!["subsurface", "energy"]);
    assert_eq!(log.kernels_for("advance"), vec!["flow"]);
}
