//! Expansion of scheduled sub-steps into a flat [`Program`].
//!
//! Each emission stage is a pure function of the current step kind and the
//! monitoring/constraint flags. [`build_splitting_program`] calls them in a
//! fixed order for every sub-step:
//!
//! 1. pre-step bookkeeping
//! 2. state update
//! 3. constraint projection
//! 4. post-step bookkeeping
//! 5. accumulation

use serde::{Deserialize, Serialize};

use crate::ledger::{Monitoring, Register};
use crate::program::{EnergySource, Instruction, PositionUpdate, Program, VelocityUpdate};
use crate::schedule::Substep;
use crate::scheme::StepKind;

/// Independently toggled constraint projections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintToggles {
    /// Project positions after every Drift.
    pub positions: bool,
    /// Project velocities after every Kick and Stochastic step.
    pub velocities: bool,
}

impl ConstraintToggles {
    /// Both projections on.
    pub const ALL: ConstraintToggles = ConstraintToggles {
        positions: true,
        velocities: true,
    };

    /// Both projections off.
    pub const NONE: ConstraintToggles = ConstraintToggles {
        positions: false,
        velocities: false,
    };
}

impl Default for ConstraintToggles {
    fn default() -> Self {
        Self::ALL
    }
}

/// Energies recorded before the update of `kind`.
pub fn pre_step_bookkeeping(kind: StepKind, monitoring: Monitoring) -> Vec<Instruction> {
    let mut emitted = Vec::new();
    if monitoring.any() && kind.updates_velocities() {
        emitted.push(Instruction::StoreEnergy {
            register: Register::OldKe,
            source: EnergySource::Kinetic,
        });
    }
    if monitoring.work && kind == StepKind::Drift {
        emitted.push(Instruction::StoreEnergy {
            register: Register::OldPe,
            source: EnergySource::Potential,
        });
    }
    emitted
}

/// The state update of `substep`; `b` is the bath retention factor.
pub fn state_update(substep: &Substep, b: f64) -> Instruction {
    match substep.kind {
        StepKind::Drift => Instruction::position(PositionUpdate::Drift {
            dt: substep.duration,
        }),
        StepKind::Kick => Instruction::velocity(VelocityUpdate::Kick {
            dt: substep.duration,
        }),
        StepKind::Stochastic => Instruction::velocity(VelocityUpdate::OrnsteinUhlenbeck { b }),
    }
}

/// Projection following the update of `kind`, if enabled.
///
/// Position projection after a Drift only corrects positions; no velocity
/// correction is derived from the displacement.
pub fn constraint_projection(kind: StepKind, constraints: ConstraintToggles) -> Option<Instruction> {
    match kind {
        StepKind::Drift if constraints.positions => Some(Instruction::ProjectPositions),
        StepKind::Kick | StepKind::Stochastic if constraints.velocities => {
            Some(Instruction::ProjectVelocities)
        }
        _ => None,
    }
}

/// Energies recorded after the update of `kind`.
pub fn post_step_bookkeeping(kind: StepKind, monitoring: Monitoring) -> Option<Instruction> {
    match kind {
        StepKind::Stochastic if monitoring.any() => Some(Instruction::StoreEnergy {
            register: Register::NewKe,
            source: EnergySource::Kinetic,
        }),
        StepKind::Drift if monitoring.work => Some(Instruction::StoreEnergy {
            register: Register::NewPe,
            source: EnergySource::Potential,
        }),
        _ => None,
    }
}

/// Accumulator update closing the sub-step of `kind`.
///
/// A Kick reads whatever `new_ke` holds at that point; only the Stochastic
/// step refreshes it.
pub fn accumulation(kind: StepKind, monitoring: Monitoring) -> Option<Instruction> {
    match kind {
        StepKind::Drift if monitoring.work => Some(Instruction::Accumulate {
            target: Register::ShadowWork,
            increment: Register::NewPe,
            decrement: Register::OldPe,
        }),
        StepKind::Kick if monitoring.work => Some(Instruction::Accumulate {
            target: Register::ShadowWork,
            increment: Register::NewKe,
            decrement: Register::OldKe,
        }),
        StepKind::Stochastic if monitoring.heat => Some(Instruction::Accumulate {
            target: Register::Heat,
            increment: Register::NewKe,
            decrement: Register::OldKe,
        }),
        _ => None,
    }
}

/// Builds the per-step program of a Langevin splitting.
pub fn build_splitting_program(
    substeps: &[Substep],
    b: f64,
    monitoring: Monitoring,
    constraints: ConstraintToggles,
) -> Program {
    let mut program = Program::new();
    for substep in substeps {
        let kind = substep.kind;
        program.extend(pre_step_bookkeeping(kind, monitoring));
        program.push(state_update(substep, b));
        program.extend(constraint_projection(kind, constraints));
        program.extend(post_step_bookkeeping(kind, monitoring));
        program.extend(accumulation(kind, monitoring));
    }
    program
}

/// One velocity-Verlet step with the RATTLE-style velocity correction.
///
/// Half-kick, drift, position projection, half-kick plus the velocity share
/// of the projection, velocity projection.
pub fn velocity_verlet(dt: f64) -> [Instruction; 7] {
    [
        Instruction::velocity(VelocityUpdate::Kick { dt: 0.5 * dt }),
        Instruction::position(PositionUpdate::Drift { dt }),
        Instruction::SavePositions,
        Instruction::ProjectPositions,
        Instruction::velocity(VelocityUpdate::Kick { dt: 0.5 * dt }),
        Instruction::velocity(VelocityUpdate::ConstraintCorrection { dt }),
        Instruction::ProjectVelocities,
    ]
}

/// `nsteps` consecutive velocity-Verlet steps.
pub fn velocity_verlet_trajectory(dt: f64, nsteps: usize) -> Program {
    (0..nsteps).flat_map(|_| velocity_verlet(dt)).collect()
}

/// Full Maxwell-Boltzmann velocity draw followed by velocity projection.
pub fn resample_velocities() -> [Instruction; 2] {
    [
        Instruction::velocity(VelocityUpdate::Resample),
        Instruction::ProjectVelocities,
    ]
}

/// Partial velocity refresh with retention `b`, then velocity projection.
pub fn mix_velocities(b: f64) -> [Instruction; 2] {
    [
        Instruction::velocity(VelocityUpdate::Mix { b }),
        Instruction::ProjectVelocities,
    ]
}
