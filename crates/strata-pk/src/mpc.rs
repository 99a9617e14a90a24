//! [`Mpc`]: the ordered sub-kernel collection shared by every coupling
//! strategy.

use std::error::Error;
use std::fmt;

use indexmap::IndexSet;
use strata_core::RegistryError;
use strata_state::State;

use crate::kernel::ProcessKernel;

// ── Errors ─────────────────────────────────────────────────────────

/// Errors from coupler construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CouplerError {
    /// No sub-kernels were supplied.
    Empty {
        /// Name of the coupler.
        coupler: String,
    },
    /// Two sub-kernels share a name, so failures could not be attributed.
    DuplicateName {
        /// Name of the coupler.
        coupler: String,
        /// The repeated sub-kernel name.
        name: String,
    },
}

impl fmt::Display for CouplerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { coupler } => write!(f, "coupler '{coupler}' has no sub-kernels"),
            Self::DuplicateName { coupler, name } => {
                write!(f, "coupler '{coupler}' has two sub-kernels named '{name}'")
            }
        }
    }
}

impl Error for CouplerError {}

// ── Container ──────────────────────────────────────────────────────

/// An ordered, non-empty sequence of sub-kernels.
///
/// Order is fixed at construction and is the only consistency mechanism
/// between sub-kernels: no dependency inference is performed.
pub struct Mpc {
    name: String,
    kernels: Vec<Box<dyn ProcessKernel>>,
}

impl Mpc {
    /// Compose `kernels` in the given order.
    pub fn new(
        name: impl Into<String>,
        kernels: Vec<Box<dyn ProcessKernel>>,
    ) -> Result<Self, CouplerError> {
        let name = name.into();
        if kernels.is_empty() {
            return Err(CouplerError::Empty { coupler: name });
        }
        let mut seen = IndexSet::with_capacity(kernels.len());
        for pk in &kernels {
            if !seen.insert(pk.name()) {
                return Err(CouplerError::DuplicateName {
                    coupler: name,
                    name: pk.name().to_string(),
                });
            }
        }
        Ok(Self { name, kernels })
    }

    /// Name of the composite.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of sub-kernels.
    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    /// Always false; construction rejects empty sequences.
    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }

    /// Sub-kernel names in order.
    pub fn names(&self) -> Vec<&str> {
        self.kernels.iter().map(|pk| pk.name()).collect()
    }

    /// Sub-kernels in order.
    pub fn kernels(&self) -> &[Box<dyn ProcessKernel>] {
        &self.kernels
    }

    /// Sub-kernels in order, mutably.
    pub fn kernels_mut(&mut self) -> &mut [Box<dyn ProcessKernel>] {
        &mut self.kernels
    }

    /// Run `setup` on every sub-kernel in order, stopping at the first error.
    pub fn setup_all(&mut self, state: &mut State) -> Result<(), RegistryError> {
        self.kernels.iter_mut().try_for_each(|pk| pk.setup(state))
    }

    /// Run `initialize` on every sub-kernel in order, stopping at the first error.
    pub fn initialize_all(&mut self, state: &mut State) -> Result<(), RegistryError> {
        self.kernels.iter_mut().try_for_each(|pk| pk.initialize(state))
    }

    /// Run `commit` on every sub-kernel in order.
    pub fn commit_all(&mut self, dt: f64, state: &State) {
        for pk in &mut self.kernels {
            pk.commit(dt, state);
        }
    }

    /// Tightest `max_dt` over the sub-kernels, if any constrains it.
    pub fn min_max_dt(&self) -> Option<f64> {
        self.kernels
            .iter()
            .filter_map(|pk| pk.max_dt())
            .reduce(f64::min)
    }
}

impl fmt::Debug for Mpc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mpc")
            .field("name", &self.name)
            .field("kernels", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AdvanceContext;
    use strata_core::PkError;

    struct Named(&'static str, Option<f64>);

    impl ProcessKernel for Named {
        fn name(&self) -> &str {
            self.0
        }
        fn setup(&mut self, _: &mut State) -> Result<(), RegistryError> {
            Ok(())
        }
        fn advance(&mut self, _: &mut AdvanceContext<'_>) -> Result<(), PkError> {
            Ok(())
        }
        fn max_dt(&self) -> Option<f64> {
            self.1
        }
    }

    #[test]
    fn empty_is_rejected() {
        assert_eq!(
            Mpc::new("surface", Vec::new()).unwrap_err(),
            CouplerError::Empty {
                coupler: "surface".into()
            }
        );
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = Mpc::new(
            "flow",
            vec![Box::new(Named("richards", None)), Box::new(Named("richards", None))],
        )
        .unwrap_err();
        assert!(matches!(err, CouplerError::DuplicateName { name, .. } if name == "richards"));
    }

    #[test]
    fn min_max_dt_ignores_unconstrained() {
        let mpc = Mpc::new(
            "pm",
            vec![
                Box::new(Named("flow", Some(10.0))),
                Box::new(Named("energy", None)),
                Box::new(Named("snow", Some(2.5))),
            ],
        )
        .unwrap();
        assert_eq!(mpc.min_max_dt(), Some(2.5));
        assert_eq!(mpc.names(), vec!["flow", "energy", "snow"]);

        let free = Mpc::new("free", vec![Box::new(Named("energy", None))]).unwrap();
        assert_eq!(free.min_max_dt(), None);
    }
}
