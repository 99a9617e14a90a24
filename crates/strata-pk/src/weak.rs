//! Weak (sequential, non-iterative) coupling.

use strata_core::{PkError, RegistryError};
use strata_state::State;
use tracing::{debug, warn};

use crate::context::AdvanceContext;
use crate::kernel::ProcessKernel;
use crate::mpc::{CouplerError, Mpc};

/// Advances its sub-kernels one after another within a step.
///
/// Each sub-kernel sees the trial state as left by the ones before it.
/// There is no feedback: earlier kernels are never re-advanced with the
/// results of later ones. The first failure ends the step; the remaining
/// sub-kernels are not advanced and the failure is reported upward wrapped
/// in [`PkError::SubKernelFailed`]. Retrying is the driver's business.
///
/// A `WeakCoupler` is itself a [`ProcessKernel`], so couplers nest.
#[derive(Debug)]
pub struct WeakCoupler {
    mpc: Mpc,
}

impl WeakCoupler {
    /// Compose `kernels` in the given order.
    pub fn new(
        name: impl Into<String>,
        kernels: Vec<Box<dyn ProcessKernel>>,
    ) -> Result<Self, CouplerError> {
        Ok(Self {
            mpc: Mpc::new(name, kernels)?,
        })
    }

    /// The underlying sub-kernel collection.
    pub fn mpc(&self) -> &Mpc {
        &self.mpc
    }
}

impl From<Mpc> for WeakCoupler {
    fn from(mpc: Mpc) -> Self {
        Self { mpc }
    }
}

impl ProcessKernel for WeakCoupler {
    fn name(&self) -> &str {
        self.mpc.name()
    }

    fn setup(&mut self, state: &mut State) -> Result<(), RegistryError> {
        self.mpc.setup_all(state)
    }

    fn initialize(&mut self, state: &mut State) -> Result<(), RegistryError> {
        self.mpc.initialize_all(state)
    }

    fn advance(&mut self, ctx: &mut AdvanceContext<'_>) -> Result<(), PkError> {
        let coupler = self.mpc.name().to_string();
        for (index, pk) in self.mpc.kernels_mut().iter_mut().enumerate() {
            debug!(
                coupler = coupler.as_str(),
                index,
                kernel = pk.name(),
                dt = ctx.dt(),
                "advancing"
            );
            if let Err(source) = pk.advance(ctx) {
                warn!(
                    coupler = coupler.as_str(),
                    index,
                    kernel = pk.name(),
                    error = %source,
                    "sub-kernel failed, abandoning step"
                );
                return Err(PkError::SubKernelFailed {
                    index,
                    name: pk.name().to_string(),
                    source: Box::new(source),
                });
            }
        }
        Ok(())
    }

    fn commit(&mut self, dt: f64, state: &State) {
        self.mpc.commit_all(dt, state);
    }

    fn max_dt(&self) -> Option<f64> {
        self.mpc.min_max_dt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use strata_mesh::ColumnMesh;

    struct Counting {
        name: &'static str,
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl ProcessKernel for Counting {
        fn name(&self) -> &str {
            self.name
        }
        fn setup(&mut self, _: &mut State) -> Result<(), RegistryError> {
            Ok(())
        }
        fn advance(&mut self, _: &mut AdvanceContext<'_>) -> Result<(), PkError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            if self.fail {
                return Err(PkError::failed("diverged"));
            }
            Ok(())
        }
    }

    fn counting(name: &'static str, fail: bool) -> (Box<dyn ProcessKernel>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let pk = Counting {
            name,
            calls: Arc::clone(&calls),
            fail,
        };
        (Box::new(pk), calls)
    }

    fn states() -> (State, State) {
        let committed = State::new(Arc::new(ColumnMesh::new(2, 1.0, 1.0).unwrap()));
        let trial = committed.derive_snapshot();
        (committed, trial)
    }

    #[test]
    fn all_succeed() {
        let (a, ca) = counting("a", false);
        let (b, cb) = counting("b", false);
        let mut weak = WeakCoupler::new("weak", vec![a, b]).unwrap();
        let (committed, mut trial) = states();
        let mut ctx = AdvanceContext::new(&committed, &mut trial, 1.0);
        weak.advance(&mut ctx).unwrap();
        assert_eq!(ca.load(Ordering::Relaxed), 1);
        assert_eq!(cb.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn built_from_an_existing_collection() {
        let (a, ca) = counting("flow", false);
        let (b, _) = counting("energy", false);
        let mut weak = WeakCoupler::from(Mpc::new("surface", vec![a, b]).unwrap());
        assert_eq!(weak.name(), "surface");
        assert_eq!(weak.mpc().names(), vec!["flow", "energy"]);

        let (committed, mut trial) = states();
        let mut ctx = AdvanceContext::new(&committed, &mut trial, 1.0);
        weak.advance(&mut ctx).unwrap();
        assert_eq!(ca.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn first_failure_short_circuits() {
        let (a, ca) = counting("a", false);
        let (b, cb) = counting("b", true);
        let (c, cc) = counting("c", false);
        let mut weak = WeakCoupler::new("weak", vec![a, b, c]).unwrap();
        let (committed, mut trial) = states();
        let mut ctx = AdvanceContext::new(&committed, &mut trial, 1.0);

        let err = weak.advance(&mut ctx).unwrap_err();
        assert!(matches!(err, PkError::SubKernelFailed { index: 1, ref name, .. } if name == "b"));
        assert_eq!(ca.load(Ordering::Relaxed), 1);
        assert_eq!(cb.load(Ordering::Relaxed), 1);
        assert_eq!(cc.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn nested_failure_keeps_the_path() {
        let (inner_ok, _) = counting("flow", false);
        let (inner_bad, _) = counting("energy", true);
        let inner = WeakCoupler::new("subsurface", vec![inner_ok, inner_bad]).unwrap();
        let (after, c_after) = counting("snow", false);
        let inner: Box<dyn ProcessKernel> = Box::new(inner);
        let mut outer = WeakCoupler::new("cycle", vec![inner, after]).unwrap();

        let (committed, mut trial) = states();
        let mut ctx = AdvanceContext::new(&committed, &mut trial, 1.0);
        let err = outer.advance(&mut ctx).unwrap_err();
        assert_eq!(err.kernel_path(), vec!["subsurface", "energy"]);
        assert_eq!(c_after.load(Ordering::Relaxed), 0);
    }
}
