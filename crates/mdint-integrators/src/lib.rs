#![deny(missing_docs)]

//! Operator-splitting compiler and Metropolized integrators.
//!
//! A splitting string such as `BAOAB` is parsed into step kinds, scheduled
//! into timed sub-steps and compiled once into a flat [`Program`] of
//! primitive instructions that is replayed against a [`DynamicsEngine`] on
//! every step. Metropolized integrators wrap a momentum refresh and a
//! proposal program with a host-side accept/reject decision.
//!
//! [`DynamicsEngine`]: mdint_core::DynamicsEngine

/// Instruction emission stages and velocity Verlet templates.
pub mod builder;
/// YAML configuration schema and integrator factory.
pub mod config;
/// Common integrator trait and parameter validation.
pub mod integrator;
/// Langevin splitting integrator.
pub mod langevin;
/// Work and heat registers.
pub mod ledger;
/// Metropolis Monte Carlo, HMC and GHMC.
pub mod metropolis;
/// Adaptive gradient descent minimizer.
pub mod minimizer;
/// Instruction set and interpreter.
pub mod program;
/// Sub-step timing.
pub mod schedule;
/// Splitting string parser.
pub mod scheme;
/// Acceptance counters.
pub mod stats;
/// Velocity Verlet, Andersen, VVVR and dummy integrators.
pub mod templates;
/// Statistical inefficiency and correlated standard errors.
pub mod timeseries;

pub use builder::{build_splitting_program, ConstraintToggles};
pub use config::IntegratorConfig;
pub use integrator::{velocity_mixing, Integrator};
pub use langevin::{LangevinSplittingConfig, LangevinSplittingIntegrator};
pub use ledger::{BookkeepingLedger, Monitoring, Register};
pub use metropolis::{metropolis_accept, MetropolisFamily, MetropolizedIntegrator, TrialRecord};
pub use minimizer::GradientDescentMinimizer;
pub use program::{ExecutionState, Instruction, Program};
pub use schedule::{schedule, Substep, SubstepWeights};
pub use scheme::{SplittingScheme, StepKind};
pub use stats::IntegratorStatistics;
pub use templates::{TemplateFamily, TemplateIntegrator};
pub use timeseries::{mean_with_standard_error, statistical_inefficiency, MeanEstimate};
