use mdint_core::DynamicsEngine;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::ledger::{BookkeepingLedger, Monitoring, Register};

/// Position assignment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum PositionUpdate {
    /// `x += dt * v`.
    Drift {
        /// Time increment in ps.
        dt: f64,
    },
    /// `x += sigma * gaussian`.
    Perturb {
        /// Displacement standard deviation in nm.
        sigma: f64,
    },
}

/// Velocity assignment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum VelocityUpdate {
    /// `v += dt * f / m`.
    Kick {
        /// Time increment in ps.
        dt: f64,
    },
    /// `v = b * v + sqrt(kT * (1 - b^2) / m) * gaussian`.
    OrnsteinUhlenbeck {
        /// Velocity retention factor `exp(-gamma * dt)`.
        b: f64,
    },
    /// `v = sqrt(b) * v + sqrt(1 - b) * sqrt(kT / m) * gaussian`.
    Mix {
        /// Velocity retention factor `exp(-gamma * dt)`.
        b: f64,
    },
    /// `v = sqrt(kT / m) * gaussian`.
    Resample,
    /// Per-DOF Andersen collision: resample `v` where `uniform <= probability`.
    Collide {
        /// Collision probability per DOF and step.
        probability: f64,
    },
    /// `v += (x - x_saved) / dt`, the velocity share of a position projection.
    ConstraintCorrection {
        /// Time increment of the preceding drift.
        dt: f64,
    },
}

/// Energy read back from the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnergySource {
    /// Kinetic energy.
    Kinetic,
    /// Potential energy.
    Potential,
}

/// Primitive operation against DOF state or the register file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Instruction {
    /// Assign positions.
    AssignPosition {
        /// Update rule.
        update: PositionUpdate,
    },
    /// Assign velocities.
    AssignVelocity {
        /// Update rule.
        update: VelocityUpdate,
    },
    /// Project positions onto the constraint manifold.
    ProjectPositions,
    /// Project velocities onto the constraint tangent space.
    ProjectVelocities,
    /// Copy positions into the scratch slot used by [`VelocityUpdate::ConstraintCorrection`].
    SavePositions,
    /// Store an energy reading into a register.
    StoreEnergy {
        /// Destination register.
        register: Register,
        /// Energy to read.
        source: EnergySource,
    },
    /// `target += increment - decrement`.
    Accumulate {
        /// Accumulator.
        target: Register,
        /// Register added.
        increment: Register,
        /// Register subtracted.
        decrement: Register,
    },
}

impl Instruction {
    /// Shorthand for a position assignment.
    pub fn position(update: PositionUpdate) -> Self {
        Instruction::AssignPosition { update }
    }

    /// Shorthand for a velocity assignment.
    pub fn velocity(update: VelocityUpdate) -> Self {
        Instruction::AssignVelocity { update }
    }
}

/// Per-DOF scratch buffers reused across steps.
#[derive(Debug, Clone, Default)]
struct Scratch {
    masses: Vec<f64>,
    buffer: Vec<f64>,
    noise: Vec<f64>,
    saved_positions: Vec<f64>,
}

impl Scratch {
    fn bind<E: DynamicsEngine + ?Sized>(&mut self, engine: &E) {
        let dofs = engine.dof_count();
        self.masses.clear();
        self.masses.extend_from_slice(engine.masses());
        self.buffer.resize(dofs, 0.0);
        self.noise.resize(dofs, 0.0);
        self.saved_positions.resize(dofs, 0.0);
    }
}

/// Everything a program reads or writes besides the engine.
#[derive(Debug, Clone)]
pub struct ExecutionState {
    thermal_energy: f64,
    ledger: BookkeepingLedger,
    scratch: Scratch,
}

impl ExecutionState {
    /// State for a bath at `thermal_energy` kJ/mol.
    pub fn new(thermal_energy: f64, monitoring: Monitoring) -> Self {
        Self {
            thermal_energy,
            ledger: BookkeepingLedger::new(monitoring),
            scratch: Scratch::default(),
        }
    }

    /// `kT` in kJ/mol.
    pub fn thermal_energy(&self) -> f64 {
        self.thermal_energy
    }

    /// Register file.
    pub fn ledger(&self) -> &BookkeepingLedger {
        &self.ledger
    }

    /// Mutable register file.
    pub fn ledger_mut(&mut self) -> &mut BookkeepingLedger {
        &mut self.ledger
    }
}

/// Flat instruction list built once and replayed unchanged on every step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    /// Empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one instruction.
    pub fn push(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    /// Appends a sequence of instructions.
    pub fn extend(&mut self, instructions: impl IntoIterator<Item = Instruction>) {
        self.instructions.extend(instructions);
    }

    /// Instructions in execution order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// True when the program does nothing.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Runs every instruction in order against `engine`.
    pub fn execute<E: DynamicsEngine + ?Sized>(&self, engine: &mut E, state: &mut ExecutionState) {
        state.scratch.bind(engine);
        for instruction in &self.instructions {
            execute_one(instruction, engine, state);
        }
    }
}

impl FromIterator<Instruction> for Program {
    fn from_iter<T: IntoIterator<Item = Instruction>>(iter: T) -> Self {
        Self {
            instructions: iter.into_iter().collect(),
        }
    }
}

fn execute_one<E: DynamicsEngine + ?Sized>(
    instruction: &Instruction,
    engine: &mut E,
    state: &mut ExecutionState,
) {
    let kt = state.thermal_energy;
    let scratch = &mut state.scratch;
    match *instruction {
        Instruction::AssignPosition { update } => match update {
            PositionUpdate::Drift { dt } => {
                scratch.buffer.copy_from_slice(engine.velocities());
                for (x, v) in engine.positions_mut().iter_mut().zip(&scratch.buffer) {
                    *x += dt * v;
                }
            }
            PositionUpdate::Perturb { sigma } => {
                engine.draw_gaussians(&mut scratch.noise);
                for (x, g) in engine.positions_mut().iter_mut().zip(&scratch.noise) {
                    *x += sigma * g;
                }
            }
        },
        Instruction::AssignVelocity { update } => assign_velocity(update, engine, kt, scratch),
        Instruction::ProjectPositions => engine.project_positions(),
        Instruction::ProjectVelocities => engine.project_velocities(),
        Instruction::SavePositions => scratch.saved_positions.copy_from_slice(engine.positions()),
        Instruction::StoreEnergy { register, source } => {
            let value = match source {
                EnergySource::Kinetic => engine.kinetic_energy(),
                EnergySource::Potential => engine.potential_energy(),
            };
            state.ledger.set(register, value);
        }
        Instruction::Accumulate {
            target,
            increment,
            decrement,
        } => {
            state.ledger.accumulate(target, increment, decrement);
            trace!(
                register = target.name(),
                value = state.ledger.get(target),
                "accumulated"
            );
        }
    }
}

fn assign_velocity<E: DynamicsEngine + ?Sized>(
    update: VelocityUpdate,
    engine: &mut E,
    kt: f64,
    scratch: &mut Scratch,
) {
    match update {
        VelocityUpdate::Kick { dt } => {
            scratch.buffer.copy_from_slice(engine.forces());
            let velocities = engine.velocities_mut();
            for ((v, f), m) in velocities.iter_mut().zip(&scratch.buffer).zip(&scratch.masses) {
                if *m > 0.0 {
                    *v += dt * f / m;
                }
            }
        }
        VelocityUpdate::OrnsteinUhlenbeck { b } => {
            engine.draw_gaussians(&mut scratch.noise);
            let velocities = engine.velocities_mut();
            for ((v, g), m) in velocities.iter_mut().zip(&scratch.noise).zip(&scratch.masses) {
                *v = b * *v + thermal_sigma(kt * (1.0 - b * b), *m) * g;
            }
        }
        VelocityUpdate::Mix { b } => {
            let retain = b.sqrt();
            let refresh = (1.0 - b).sqrt();
            engine.draw_gaussians(&mut scratch.noise);
            let velocities = engine.velocities_mut();
            for ((v, g), m) in velocities.iter_mut().zip(&scratch.noise).zip(&scratch.masses) {
                *v = retain * *v + refresh * thermal_sigma(kt, *m) * g;
            }
        }
        VelocityUpdate::Resample => {
            engine.draw_gaussians(&mut scratch.noise);
            let velocities = engine.velocities_mut();
            for ((v, g), m) in velocities.iter_mut().zip(&scratch.noise).zip(&scratch.masses) {
                *v = thermal_sigma(kt, *m) * g;
            }
        }
        VelocityUpdate::Collide { probability } => {
            engine.draw_uniforms(&mut scratch.buffer);
            engine.draw_gaussians(&mut scratch.noise);
            let velocities = engine.velocities_mut();
            let draws = scratch.buffer.iter().zip(&scratch.noise).zip(&scratch.masses);
            for (v, ((u, g), m)) in velocities.iter_mut().zip(draws) {
                if *u <= probability {
                    *v = thermal_sigma(kt, *m) * g;
                }
            }
        }
        VelocityUpdate::ConstraintCorrection { dt } => {
            scratch.buffer.copy_from_slice(engine.positions());
            let velocities = engine.velocities_mut();
            let displaced = scratch.buffer.iter().zip(&scratch.saved_positions);
            for (v, (x, x_saved)) in velocities.iter_mut().zip(displaced) {
                *v += (x - x_saved) / dt;
            }
        }
    }
}

/// `sqrt(variance / m)`, zero for massless DOFs.
fn thermal_sigma(variance: f64, mass: f64) -> f64 {
    if mass > 0.0 {
        (variance / mass).sqrt()
    } else {
        0.0
    }
}
