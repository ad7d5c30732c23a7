//! Metropolis accept/reject around a momentum refresh and a proposal program.
//!
//! One trial runs: draw momenta, snapshot, propose, evaluate, then either
//! commit or roll back, and finally update the counters. The accept/reject
//! branch is evaluated here on the host after a synchronous energy read-back
//! from the engine.

use mdint_core::{DynamicsEngine, IntegratorError};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::builder::{mix_velocities, resample_velocities, velocity_verlet_trajectory};
use crate::integrator::{
    checked_collision_rate, checked_nsteps, checked_thermal_energy, checked_timestep, drive,
    velocity_mixing, Integrator,
};
use crate::ledger::Monitoring;
use crate::program::{ExecutionState, Instruction, PositionUpdate, Program};
use crate::stats::IntegratorStatistics;

/// Metropolized integrator flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetropolisFamily {
    /// Gaussian position perturbation.
    MonteCarlo,
    /// Hybrid Monte Carlo with full momentum resampling.
    Hmc,
    /// Generalized HMC with partial momentum refresh.
    Ghmc,
}

impl MetropolisFamily {
    /// Family name.
    pub fn name(&self) -> &'static str {
        match self {
            MetropolisFamily::MonteCarlo => "metropolis-monte-carlo",
            MetropolisFamily::Hmc => "hmc",
            MetropolisFamily::Ghmc => "ghmc",
        }
    }

    fn rollback(&self) -> Rollback {
        match self {
            MetropolisFamily::Ghmc => Rollback::FlipMomenta,
            MetropolisFamily::MonteCarlo | MetropolisFamily::Hmc => Rollback::Restore,
        }
    }
}

/// What a rejected trial does to the velocities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rollback {
    /// Restore the post-refresh velocities as saved.
    Restore,
    /// Restore the negated post-refresh velocities.
    FlipMomenta,
}

/// State saved before the proposal runs.
#[derive(Debug, Clone, Default)]
struct TrialSnapshot {
    positions: Vec<f64>,
    velocities: Vec<f64>,
}

impl TrialSnapshot {
    fn capture(&mut self, engine: &dyn DynamicsEngine) {
        self.positions.clear();
        self.positions.extend_from_slice(engine.positions());
        self.velocities.clear();
        self.velocities.extend_from_slice(engine.velocities());
    }

    fn restore(&self, engine: &mut dyn DynamicsEngine, rollback: Rollback) {
        engine.positions_mut().copy_from_slice(&self.positions);
        let velocities = engine.velocities_mut();
        match rollback {
            Rollback::Restore => velocities.copy_from_slice(&self.velocities),
            Rollback::FlipMomenta => {
                for (v, saved) in velocities.iter_mut().zip(&self.velocities) {
                    *v = -saved;
                }
            }
        }
    }
}

/// Outcome of the most recent trial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    /// Total energy before the proposal.
    pub energy_old: f64,
    /// Total energy of the proposed state.
    pub energy_new: f64,
    /// `energy_new - energy_old`.
    pub delta_energy: f64,
    /// Uniform draw compared against the Metropolis ratio.
    pub uniform: f64,
    /// Whether the proposal was committed.
    pub accepted: bool,
}

/// Metropolis criterion `exp(-delta / kt) > uniform`.
///
/// A non-finite `delta` is always rejected. The comparison is strict, so a
/// uniform equal to the ratio rejects.
pub fn metropolis_accept(delta_energy: f64, thermal_energy: f64, uniform: f64) -> bool {
    if !delta_energy.is_finite() {
        return false;
    }
    (-delta_energy / thermal_energy).exp() > uniform
}

/// Refresh, propose, then accept or reject on total energy.
#[derive(Debug, Clone)]
pub struct MetropolizedIntegrator {
    family: MetropolisFamily,
    timestep: f64,
    state: ExecutionState,
    refresh: Program,
    proposal: Program,
    rollback: Rollback,
    statistics: IntegratorStatistics,
    snapshot: TrialSnapshot,
    last_trial: Option<TrialRecord>,
}

impl MetropolizedIntegrator {
    /// Metropolis Monte Carlo with per-DOF Gaussian displacements of width
    /// `sigma` nm. `timestep` only advances the clock.
    pub fn metropolis_monte_carlo(
        temperature: f64,
        sigma: f64,
        timestep: f64,
    ) -> Result<Self, IntegratorError> {
        if !(sigma.is_finite() && sigma >= 0.0) {
            return Err(IntegratorError::configuration(
                "negative-perturbation",
                "sigma",
                sigma,
                "perturbation size must be finite and non-negative",
            ));
        }
        let proposal = Program::from_iter([
            Instruction::position(PositionUpdate::Perturb { sigma }),
            Instruction::ProjectPositions,
        ]);
        Self::assemble(
            MetropolisFamily::MonteCarlo,
            temperature,
            timestep,
            resample_velocities().into_iter().collect(),
            proposal,
        )
    }

    /// Hybrid Monte Carlo: full momentum resample, then `nsteps` velocity
    /// Verlet steps of `timestep`.
    pub fn hmc(temperature: f64, nsteps: usize, timestep: f64) -> Result<Self, IntegratorError> {
        let nsteps = checked_nsteps(nsteps)?;
        let timestep = checked_timestep(timestep)?;
        Self::assemble(
            MetropolisFamily::Hmc,
            temperature,
            timestep,
            resample_velocities().into_iter().collect(),
            velocity_verlet_trajectory(timestep, nsteps),
        )
    }

    /// Generalized HMC: partial momentum refresh with `b = exp(-gamma * dt)`
    /// and momentum flip on rejection.
    ///
    /// The refresh ends by projecting positions and velocities, so the energy
    /// before the proposal is taken on the constraint manifold.
    pub fn ghmc(
        temperature: f64,
        collision_rate: f64,
        timestep: f64,
        nsteps: usize,
    ) -> Result<Self, IntegratorError> {
        let collision_rate = checked_collision_rate(collision_rate)?;
        let nsteps = checked_nsteps(nsteps)?;
        let timestep = checked_timestep(timestep)?;
        let b = velocity_mixing(collision_rate, timestep);
        let mut refresh: Program = mix_velocities(b).into_iter().collect();
        refresh.extend([Instruction::ProjectPositions, Instruction::ProjectVelocities]);
        Self::assemble(
            MetropolisFamily::Ghmc,
            temperature,
            timestep,
            refresh,
            velocity_verlet_trajectory(timestep, nsteps),
        )
    }

    fn assemble(
        family: MetropolisFamily,
        temperature: f64,
        timestep: f64,
        refresh: Program,
        proposal: Program,
    ) -> Result<Self, IntegratorError> {
        let kt = checked_thermal_energy(temperature)?;
        let timestep = checked_timestep(timestep)?;
        debug!(
            family = family.name(),
            kt,
            timestep,
            refresh_len = refresh.len(),
            proposal_len = proposal.len(),
            "constructed metropolized integrator"
        );
        Ok(Self {
            family,
            timestep,
            state: ExecutionState::new(kt, Monitoring::OFF),
            refresh,
            proposal,
            rollback: family.rollback(),
            statistics: IntegratorStatistics::new(),
            snapshot: TrialSnapshot::default(),
            last_trial: None,
        })
    }

    /// Integrator flavour.
    pub fn family(&self) -> MetropolisFamily {
        self.family
    }

    /// `kT` in kJ/mol.
    pub fn thermal_energy(&self) -> f64 {
        self.state.thermal_energy()
    }

    /// Momentum refresh program.
    pub fn refresh(&self) -> &Program {
        &self.refresh
    }

    /// Proposal program.
    pub fn proposal(&self) -> &Program {
        &self.proposal
    }

    /// Accepted over attempted trials, `None` before the first trial.
    pub fn acceptance_rate(&self) -> Option<f64> {
        self.statistics.acceptance_rate()
    }

    /// Outcome of the most recent trial.
    pub fn last_trial(&self) -> Option<&TrialRecord> {
        self.last_trial.as_ref()
    }

    /// Zeroes the acceptance counters.
    pub fn reset_statistics(&mut self) {
        self.statistics = IntegratorStatistics::new();
    }

    fn trial(&mut self, engine: &mut dyn DynamicsEngine) -> TrialRecord {
        self.refresh.execute(engine, &mut self.state);

        self.snapshot.capture(engine);
        let energy_old = total_energy(engine);

        self.proposal.execute(engine, &mut self.state);
        let energy_new = total_energy(engine);

        let delta_energy = energy_new - energy_old;
        let uniform = engine.draw_uniform();
        let accepted = metropolis_accept(delta_energy, self.state.thermal_energy(), uniform);
        if !delta_energy.is_finite() {
            warn!(
                family = self.family.name(),
                energy_old, energy_new, "non-finite energy change, rejecting trial"
            );
        }
        if !accepted {
            self.snapshot.restore(engine, self.rollback);
        }
        self.statistics.record(accepted);
        trace!(
            family = self.family.name(),
            delta_energy,
            uniform,
            accepted,
            "metropolis trial"
        );

        TrialRecord {
            energy_old,
            energy_new,
            delta_energy,
            uniform,
            accepted,
        }
    }
}

impl Integrator for MetropolizedIntegrator {
    fn name(&self) -> &'static str {
        self.family.name()
    }

    fn timestep(&self) -> f64 {
        self.timestep
    }

    fn step(&mut self, engine: &mut dyn DynamicsEngine, steps: usize) {
        let timestep = self.timestep;
        drive(engine, steps, timestep, |engine| {
            let record = self.trial(engine);
            self.last_trial = Some(record);
        });
    }

    fn statistics(&self) -> Option<&IntegratorStatistics> {
        Some(&self.statistics)
    }
}

fn total_energy(engine: &mut dyn DynamicsEngine) -> f64 {
    engine.kinetic_energy() + engine.potential_energy()
}
