//! In-process CPU engine used to exercise integrators.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::engine::DynamicsEngine;
use crate::errors::{ErrorInfo, IntegratorError};
use crate::rng::RngHandle;
use crate::units::thermal_energy;

/// Potential energy surface evaluated by the [`ReferenceEngine`].
pub trait Potential: Send + Sync {
    /// Potential energy at `positions`.
    fn energy(&self, positions: &[f64]) -> f64;

    /// Writes `-dU/dx` at `positions` into `out`.
    fn forces(&self, positions: &[f64], out: &mut [f64]);
}

/// Independent harmonic wells `U = sum(0.5 * K * (x - x0)^2)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HarmonicPotential {
    /// Spring constant in kJ/(mol nm^2).
    pub spring_constant: f64,
    /// Equilibrium position shared by every DOF.
    pub center: f64,
}

impl HarmonicPotential {
    /// Creates a well centred at the origin.
    pub fn new(spring_constant: f64) -> Self {
        Self {
            spring_constant,
            center: 0.0,
        }
    }
}

impl Potential for HarmonicPotential {
    fn energy(&self, positions: &[f64]) -> f64 {
        positions
            .iter()
            .map(|x| {
                let dx = x - self.center;
                0.5 * self.spring_constant * dx * dx
            })
            .sum()
    }

    fn forces(&self, positions: &[f64], out: &mut [f64]) {
        for (force, x) in out.iter_mut().zip(positions) {
            *force = -self.spring_constant * (x - self.center);
        }
    }
}

/// Flat-array dynamics engine with frozen-DOF constraints.
///
/// Forces are recomputed lazily after any position write. Constraints pin a
/// DOF to its anchor: position projection resets the coordinate and velocity
/// projection zeroes the component, so both projections are idempotent.
pub struct ReferenceEngine {
    positions: Vec<f64>,
    velocities: Vec<f64>,
    masses: Vec<f64>,
    forces: Vec<f64>,
    forces_stale: bool,
    potential: Box<dyn Potential>,
    anchors: BTreeMap<usize, f64>,
    rng: RngHandle,
    time: f64,
    context_updates: u64,
}

impl fmt::Debug for ReferenceEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceEngine")
            .field("dofs", &self.positions.len())
            .field("time", &self.time)
            .field("anchors", &self.anchors)
            .finish_non_exhaustive()
    }
}

impl ReferenceEngine {
    /// Creates an engine at rest at the origin with the given per-DOF masses.
    pub fn new(
        masses: Vec<f64>,
        potential: impl Potential + 'static,
        rng: RngHandle,
    ) -> Result<Self, IntegratorError> {
        if let Some((index, mass)) = masses
            .iter()
            .enumerate()
            .find(|(_, m)| !m.is_finite() || **m < 0.0)
        {
            return Err(IntegratorError::Configuration(
                ErrorInfo::new("invalid-mass", "masses must be finite and non-negative")
                    .with_context("dof", index.to_string())
                    .with_context("value", mass.to_string()),
            ));
        }
        let dofs = masses.len();
        debug!(dofs, "constructed reference engine");
        Ok(Self {
            positions: vec![0.0; dofs],
            velocities: vec![0.0; dofs],
            masses,
            forces: vec![0.0; dofs],
            forces_stale: true,
            potential: Box::new(potential),
            anchors: BTreeMap::new(),
            rng,
            time: 0.0,
            context_updates: 0,
        })
    }

    /// Overwrites every position.
    pub fn set_positions(&mut self, positions: &[f64]) -> Result<(), IntegratorError> {
        check_len("positions", positions.len(), self.positions.len())?;
        self.positions.copy_from_slice(positions);
        self.forces_stale = true;
        Ok(())
    }

    /// Overwrites every velocity.
    pub fn set_velocities(&mut self, velocities: &[f64]) -> Result<(), IntegratorError> {
        check_len("velocities", velocities.len(), self.velocities.len())?;
        self.velocities.copy_from_slice(velocities);
        Ok(())
    }

    /// Draws velocities from the Maxwell-Boltzmann distribution at `temperature` kelvin.
    pub fn set_velocities_to_temperature(
        &mut self,
        temperature: f64,
    ) -> Result<(), IntegratorError> {
        if !(temperature.is_finite() && temperature > 0.0) {
            return Err(IntegratorError::configuration(
                "non-positive-temperature",
                "temperature",
                temperature,
                "temperature must be finite and positive",
            ));
        }
        let kt = thermal_energy(temperature);
        for (v, m) in self.velocities.iter_mut().zip(&self.masses) {
            *v = if *m > 0.0 {
                (kt / m).sqrt() * self.rng.gaussian()
            } else {
                0.0
            };
        }
        self.project_velocities();
        Ok(())
    }

    /// Pins `dof` at its current position.
    pub fn freeze(&mut self, dof: usize) -> Result<(), IntegratorError> {
        let anchor = self.positions.get(dof).copied().ok_or_else(|| {
            IntegratorError::configuration(
                "dof-out-of-range",
                "dof",
                dof,
                "cannot constrain a DOF the engine does not own",
            )
        })?;
        self.anchors.insert(dof, anchor);
        debug!(dof, anchor, "frozen degree of freedom");
        Ok(())
    }

    /// Number of times the pre-step hook fired.
    pub fn context_updates(&self) -> u64 {
        self.context_updates
    }
}

fn check_len(name: &str, got: usize, expected: usize) -> Result<(), IntegratorError> {
    if got == expected {
        return Ok(());
    }
    Err(IntegratorError::Configuration(
        ErrorInfo::new("length-mismatch", format!("{name} length does not match DOF count"))
            .with_context("expected", expected.to_string())
            .with_context("got", got.to_string()),
    ))
}

impl DynamicsEngine for ReferenceEngine {
    fn dof_count(&self) -> usize {
        self.positions.len()
    }

    fn positions(&self) -> &[f64] {
        &self.positions
    }

    fn positions_mut(&mut self) -> &mut [f64] {
        self.forces_stale = true;
        &mut self.positions
    }

    fn velocities(&self) -> &[f64] {
        &self.velocities
    }

    fn velocities_mut(&mut self) -> &mut [f64] {
        &mut self.velocities
    }

    fn masses(&self) -> &[f64] {
        &self.masses
    }

    fn forces(&mut self) -> &[f64] {
        if self.forces_stale {
            self.potential.forces(&self.positions, &mut self.forces);
            self.forces_stale = false;
        }
        &self.forces
    }

    fn potential_energy(&mut self) -> f64 {
        self.potential.energy(&self.positions)
    }

    fn project_positions(&mut self) {
        if self.anchors.is_empty() {
            return;
        }
        for (&dof, &anchor) in &self.anchors {
            self.positions[dof] = anchor;
        }
        self.forces_stale = true;
    }

    fn project_velocities(&mut self) {
        for &dof in self.anchors.keys() {
            self.velocities[dof] = 0.0;
        }
    }

    fn draw_gaussians(&mut self, out: &mut [f64]) {
        self.rng.fill_gaussian(out);
    }

    fn draw_uniform(&mut self) -> f64 {
        self.rng.uniform()
    }

    fn update_context_state(&mut self) {
        self.context_updates += 1;
    }

    fn time(&self) -> f64 {
        self.time
    }

    fn advance_time(&mut self, dt: f64) {
        self.time += dt;
    }
}
