//! Fixed-template integrators without an accept/reject step.

use mdint_core::{DynamicsEngine, IntegratorError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::builder::{mix_velocities, velocity_verlet};
use crate::integrator::{
    checked_collision_rate, checked_thermal_energy, checked_timestep, drive, velocity_mixing,
    Integrator,
};
use crate::ledger::Monitoring;
use crate::program::{ExecutionState, Instruction, Program, VelocityUpdate};

/// Template flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateFamily {
    /// Plain velocity Verlet.
    VelocityVerlet,
    /// Per-DOF Andersen collisions before each velocity Verlet step.
    AndersenVelocityVerlet,
    /// Velocity Verlet between two half-step velocity randomizations.
    Vvvr,
    /// Constraint projection only; the clock never advances.
    Dummy,
}

impl TemplateFamily {
    /// Family name.
    pub fn name(&self) -> &'static str {
        match self {
            TemplateFamily::VelocityVerlet => "velocity-verlet",
            TemplateFamily::AndersenVelocityVerlet => "andersen-velocity-verlet",
            TemplateFamily::Vvvr => "vvvr",
            TemplateFamily::Dummy => "dummy",
        }
    }
}

/// Integrator replaying one fixed program per step.
#[derive(Debug, Clone)]
pub struct TemplateIntegrator {
    family: TemplateFamily,
    timestep: f64,
    program: Program,
    state: ExecutionState,
}

impl TemplateIntegrator {
    /// Velocity Verlet with RATTLE-style constraint handling.
    pub fn velocity_verlet(timestep: f64) -> Result<Self, IntegratorError> {
        let timestep = checked_timestep(timestep)?;
        let program = velocity_verlet(timestep).into_iter().collect();
        Ok(Self::assemble(TemplateFamily::VelocityVerlet, timestep, 0.0, program))
    }

    /// Andersen thermostat: each DOF collides with probability
    /// `collision_rate * timestep` per step.
    pub fn andersen(
        temperature: f64,
        collision_rate: f64,
        timestep: f64,
    ) -> Result<Self, IntegratorError> {
        let kt = checked_thermal_energy(temperature)?;
        let collision_rate = checked_collision_rate(collision_rate)?;
        let timestep = checked_timestep(timestep)?;
        let probability = collision_rate * timestep;

        let mut program = Program::new();
        program.push(Instruction::velocity(VelocityUpdate::Collide { probability }));
        program.push(Instruction::ProjectVelocities);
        program.extend(velocity_verlet(timestep));
        Ok(Self::assemble(
            TemplateFamily::AndersenVelocityVerlet,
            timestep,
            kt,
            program,
        ))
    }

    /// Velocity Verlet with velocity randomization.
    pub fn vvvr(
        temperature: f64,
        collision_rate: f64,
        timestep: f64,
    ) -> Result<Self, IntegratorError> {
        let kt = checked_thermal_energy(temperature)?;
        let collision_rate = checked_collision_rate(collision_rate)?;
        let timestep = checked_timestep(timestep)?;
        let b = velocity_mixing(collision_rate, timestep);

        let mut program = Program::new();
        program.extend(mix_velocities(b));
        program.extend(velocity_verlet(timestep));
        program.extend(mix_velocities(b));
        Ok(Self::assemble(TemplateFamily::Vvvr, timestep, kt, program))
    }

    /// Projects positions and velocities without moving anything.
    pub fn dummy() -> Self {
        let program = Program::from_iter([
            Instruction::ProjectPositions,
            Instruction::ProjectVelocities,
        ]);
        Self::assemble(TemplateFamily::Dummy, 0.0, 0.0, program)
    }

    fn assemble(family: TemplateFamily, timestep: f64, kt: f64, program: Program) -> Self {
        debug!(
            family = family.name(),
            timestep,
            kt,
            instructions = program.len(),
            "constructed template integrator"
        );
        Self {
            family,
            timestep,
            program,
            state: ExecutionState::new(kt, Monitoring::OFF),
        }
    }

    /// Template flavour.
    pub fn family(&self) -> TemplateFamily {
        self.family
    }

    /// Per-step program.
    pub fn program(&self) -> &Program {
        &self.program
    }
}

impl Integrator for TemplateIntegrator {
    fn name(&self) -> &'static str {
        self.family.name()
    }

    fn timestep(&self) -> f64 {
        self.timestep
    }

    fn step(&mut self, engine: &mut dyn DynamicsEngine, steps: usize) {
        let program = &self.program;
        let state = &mut self.state;
        drive(engine, steps, self.timestep, |engine| {
            program.execute(engine, state)
        });
    }
}
