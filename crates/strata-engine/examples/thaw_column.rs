//! Thawing a frozen soil column: two weakly coupled process kernels.
//!
//! Demonstrates:
//!   1. A vertical `ColumnMesh` with a surface block
//!   2. Two process kernels claiming their fields during setup
//!   3. Initial conditions from `"Constant ..."` configuration keys
//!   4. A `WeakCoupler` running conduction before the phase split
//!   5. A `Coordinator` run clipped by the conduction kernel's stability limit
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example thaw_column

use std::sync::Arc;

use strata_core::{FieldLocation, Owner, ParameterList, PkError, RegistryError};
use strata_engine::Coordinator;
use strata_mesh::ColumnMesh;
use strata_pk::{AdvanceContext, ProcessKernel, WeakCoupler};
use strata_state::{MemoryVis, State};
use tracing_subscriber::{fmt, EnvFilter};

// ─── Column parameters ──────────────────────────────────────────

const CELLS: usize = 20;
const DZ: f64 = 0.5;
const DIFFUSIVITY: f64 = 5.0e-6;
const SURFACE_TEMPERATURE: f64 = 278.15;
const FREEZING_POINT: f64 = 273.15;
/// Width of the freezing interval, in kelvin.
const FREEZING_RANGE: f64 = 2.0;
const DAY: f64 = 86400.0;

// ─── Kernel: heat conduction ────────────────────────────────────
//
// Explicit finite volumes on the previous temperature. The top cell
// exchanges heat with a fixed surface temperature; the bottom is insulated.

struct Conduction {
    owner: Owner,
}

impl ProcessKernel for Conduction {
    fn name(&self) -> &str {
        "conduction"
    }

    fn setup(&mut self, state: &mut State) -> Result<(), RegistryError> {
        let _ = state.require_field("temperature", FieldLocation::Cell, self.owner.clone(), 1)?;
        state.set_subfield_names("temperature", vec!["temperature".into()])
    }

    fn advance(&mut self, ctx: &mut AdvanceContext<'_>) -> Result<(), PkError> {
        let dz = ctx
            .previous()
            .mesh()
            .downcast_ref::<ColumnMesh>()
            .map(ColumnMesh::dz)
            .ok_or_else(|| PkError::failed("conduction needs a column mesh"))?;
        let r = DIFFUSIVITY * ctx.dt() / (dz * dz);
        let old = ctx.previous().field("temperature")?.as_slice();
        let n = old.len();

        let new = ctx.state_mut().field_mut("temperature", &self.owner)?;
        for (i, t) in new.as_mut_slice().iter_mut().enumerate() {
            let below = if i == 0 { old[i] } else { old[i - 1] };
            // Half-cell distance to the surface boundary.
            let above = if i + 1 == n {
                2.0 * SURFACE_TEMPERATURE - old[i]
            } else {
                old[i + 1]
            };
            *t = old[i] + r * (below - 2.0 * old[i] + above);
        }
        if new.as_slice().iter().any(|t| !t.is_finite()) {
            return Err(PkError::failed("temperature diverged"));
        }
        Ok(())
    }

    fn max_dt(&self) -> Option<f64> {
        Some(0.5 * DZ * DZ / DIFFUSIVITY)
    }
}

// ─── Kernel: liquid/ice partition ───────────────────────────────
//
// Reads the temperature just written by conduction (weak coupling order)
// and splits the pore water linearly across the freezing interval.

struct PhasePartition {
    owner: Owner,
}

impl ProcessKernel for PhasePartition {
    fn name(&self) -> &str {
        "phase_partition"
    }

    fn setup(&mut self, state: &mut State) -> Result<(), RegistryError> {
        let _ = state.require_field("temperature", FieldLocation::Cell, Owner::Registry, 1)?;
        let _ = state.require_field("saturation", FieldLocation::Cell, self.owner.clone(), 2)?;
        state.set_subfield_names(
            "saturation",
            vec!["liquid saturation".into(), "ice saturation".into()],
        )
    }

    fn advance(&mut self, ctx: &mut AdvanceContext<'_>) -> Result<(), PkError> {
        let temperature = ctx.state().field("temperature")?.as_slice().to_vec();
        let saturation = ctx.state_mut().field_mut("saturation", &self.owner)?;
        let (liquid, ice) = saturation.as_mut_slice().split_at_mut(temperature.len());
        for ((t, l), i) in temperature.iter().zip(liquid).zip(ice) {
            *l = ((t - FREEZING_POINT) / FREEZING_RANGE + 0.5).clamp(0.0, 1.0);
            *i = 1.0 - *l;
        }
        Ok(())
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let mesh = ColumnMesh::new(CELLS, DZ, 1.0)?.with_block(1, CELLS - 2..CELLS)?;
    let params = ParameterList::new()
        .with_f64("Gravity x", 0.0)
        .with_f64("Gravity y", 0.0)
        .with_f64("Gravity z", -9.80665)
        .with_f64("Constant water density", 998.2)
        .with_f64("Constant temperature", 268.15)
        .with_f64("Constant liquid saturation", 0.0)
        .with_f64("Constant ice saturation", 1.0)
        .with_i64("Number of mesh blocks", 1)
        .with_list(
            "Mesh block 1",
            ParameterList::new()
                .with_i64("Mesh block ID", 1)
                .with_f64("Constant temperature", 272.15),
        )
        .with_list(
            "Coordinator",
            ParameterList::new()
                .with_f64("End time", 60.0 * DAY)
                .with_f64("Initial time step", DAY)
                .with_i64("Max consecutive failures", 5),
        );

    let pk = WeakCoupler::new(
        "permafrost",
        vec![
            Box::new(Conduction {
                owner: Owner::kernel("conduction"),
            }) as Box<dyn ProcessKernel>,
            Box::new(PhasePartition {
                owner: Owner::kernel("phase_partition"),
            }),
        ],
    )?;

    let mut coordinator = Coordinator::from_params(Box::new(pk), Arc::new(mesh), params)?;
    let mut vis = MemoryVis::every(50);
    let summary = coordinator.run(&mut vis)?;

    println!(
        "{} steps to t = {:.1} days, {} visualization records",
        summary.steps,
        summary.time / DAY,
        vis.steps().len()
    );

    let state = coordinator.state();
    let temperature = state.field("temperature")?.as_slice();
    let liquid = state
        .field("saturation")?
        .component(0)
        .ok_or("saturation has no liquid component")?;
    let column = state
        .mesh()
        .downcast_ref::<ColumnMesh>()
        .ok_or("column mesh expected")?;
    println!("{:>8} {:>10} {:>8}", "z [m]", "T [K]", "liquid");
    for cell in (0..CELLS).rev() {
        println!(
            "{:>8.2} {:>10.3} {:>8.3}",
            column.cell_centroid_z(cell),
            temperature[cell],
            liquid[cell]
        );
    }
    Ok(())
}
