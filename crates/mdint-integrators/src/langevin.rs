use mdint_core::{DynamicsEngine, IntegratorError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::builder::{build_splitting_program, ConstraintToggles};
use crate::integrator::{
    checked_collision_rate, checked_thermal_energy, checked_timestep, drive, velocity_mixing,
    Integrator,
};
use crate::ledger::{BookkeepingLedger, Monitoring};
use crate::program::{ExecutionState, Program};
use crate::schedule::{schedule, Substep};
use crate::scheme::SplittingScheme;

/// Parameters of a Langevin splitting integrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LangevinSplittingConfig {
    /// Bath temperature in K.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Friction coefficient in 1/ps.
    #[serde(default = "default_collision_rate")]
    pub collision_rate: f64,
    /// Integration timestep in ps.
    #[serde(default = "default_timestep")]
    pub timestep: f64,
    /// Splitting string over `A`, `B` and `O`.
    #[serde(default = "default_splitting")]
    pub splitting: SplittingScheme,
    /// Constraint projections applied after each sub-step.
    #[serde(default)]
    pub constraints: ConstraintToggles,
    /// Work and heat accumulation.
    #[serde(default)]
    pub monitoring: Monitoring,
}

pub(crate) fn default_temperature() -> f64 {
    298.0
}

pub(crate) fn default_collision_rate() -> f64 {
    91.0
}

pub(crate) fn default_timestep() -> f64 {
    mdint_core::units::femtoseconds(1.0)
}

fn default_splitting() -> SplittingScheme {
    SplittingScheme::baoab()
}

impl Default for LangevinSplittingConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            collision_rate: default_collision_rate(),
            timestep: default_timestep(),
            splitting: default_splitting(),
            constraints: ConstraintToggles::default(),
            monitoring: Monitoring::OFF,
        }
    }
}

/// Langevin dynamics from an operator splitting, compiled once into a flat
/// program.
#[derive(Debug, Clone)]
pub struct LangevinSplittingIntegrator {
    scheme: SplittingScheme,
    substeps: Vec<Substep>,
    program: Program,
    timestep: f64,
    b: f64,
    state: ExecutionState,
}

impl LangevinSplittingIntegrator {
    /// Validates `config` and compiles its splitting.
    pub fn new(config: &LangevinSplittingConfig) -> Result<Self, IntegratorError> {
        let kt = checked_thermal_energy(config.temperature)?;
        let collision_rate = checked_collision_rate(config.collision_rate)?;
        let timestep = checked_timestep(config.timestep)?;
        let b = velocity_mixing(collision_rate, timestep);

        let scheme = config.splitting.clone();
        let substeps = schedule(&scheme, timestep);
        let program =
            build_splitting_program(&substeps, b, config.monitoring, config.constraints);
        debug!(
            splitting = %scheme,
            kt,
            b,
            timestep,
            instructions = program.len(),
            "constructed langevin splitting integrator"
        );

        Ok(Self {
            scheme,
            substeps,
            program,
            timestep,
            b,
            state: ExecutionState::new(kt, config.monitoring),
        })
    }

    /// Parsed splitting.
    pub fn scheme(&self) -> &SplittingScheme {
        &self.scheme
    }

    /// Scheduled sub-steps.
    pub fn substeps(&self) -> &[Substep] {
        &self.substeps
    }

    /// Compiled per-step program.
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Velocity retention factor `exp(-gamma * dt)`.
    pub fn velocity_mixing(&self) -> f64 {
        self.b
    }

    /// `kT` in kJ/mol.
    pub fn thermal_energy(&self) -> f64 {
        self.state.thermal_energy()
    }

    /// Accumulated shadow work in kJ/mol, if work monitoring is on.
    pub fn shadow_work(&self) -> Option<f64> {
        self.state.ledger().shadow_work()
    }

    /// Accumulated heat in kJ/mol, if heat monitoring is on.
    pub fn heat(&self) -> Option<f64> {
        self.state.ledger().heat()
    }

    /// Clears every bookkeeping register.
    pub fn reset_bookkeeping(&mut self) {
        self.state.ledger_mut().reset();
    }
}

impl Integrator for LangevinSplittingIntegrator {
    fn name(&self) -> &'static str {
        "langevin-splitting"
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

    fn ledger(&self) -> Option<&BookkeepingLedger> {
        self.state.ledger().monitoring().any().then(|| self.state.ledger())
    }
}
