use mdint_core::{thermal_energy, DynamicsEngine, IntegratorError};

use crate::ledger::BookkeepingLedger;
use crate::stats::IntegratorStatistics;

/// Common surface of every integrator family.
pub trait Integrator: Send {
    /// Short family name (`"hmc"`, `"langevin-splitting"`, ...).
    fn name(&self) -> &'static str;

    /// Clock increment per outer step in ps.
    fn timestep(&self) -> f64;

    /// Advances `engine` by `steps` outer steps.
    ///
    /// Each outer step fires the engine's pre-step hook once, runs the full
    /// program to completion and advances the simulated clock by
    /// [`timestep`](Integrator::timestep). For Metropolized integrators one
    /// outer step is one trial, which performs `nsteps` physical velocity
    /// Verlet sub-steps while the clock still advances by a single timestep.
    fn step(&mut self, engine: &mut dyn DynamicsEngine, steps: usize);

    /// Acceptance counters, for integrators that accept or reject.
    fn statistics(&self) -> Option<&IntegratorStatistics> {
        None
    }

    /// Bookkeeping registers, for integrators that monitor work or heat.
    fn ledger(&self) -> Option<&BookkeepingLedger> {
        None
    }
}

/// Runs `steps` outer steps of `body`, wrapping each in the pre-step hook and
/// the clock advance.
pub(crate) fn drive<F>(engine: &mut dyn DynamicsEngine, steps: usize, timestep: f64, mut body: F)
where
    F: FnMut(&mut dyn DynamicsEngine),
{
    for _ in 0..steps {
        engine.update_context_state();
        body(&mut *engine);
        engine.advance_time(timestep);
    }
}

/// Validates a temperature in kelvin and returns `kT` in kJ/mol.
pub(crate) fn checked_thermal_energy(temperature: f64) -> Result<f64, IntegratorError> {
    if !(temperature.is_finite() && temperature > 0.0) {
        return Err(IntegratorError::configuration(
            "non-positive-temperature",
            "temperature",
            temperature,
            "temperature must be finite and positive",
        ));
    }
    Ok(thermal_energy(temperature))
}

/// Validates a timestep in ps.
pub(crate) fn checked_timestep(timestep: f64) -> Result<f64, IntegratorError> {
    if !(timestep.is_finite() && timestep > 0.0) {
        return Err(IntegratorError::configuration(
            "non-positive-timestep",
            "timestep",
            timestep,
            "timestep must be finite and positive",
        ));
    }
    Ok(timestep)
}

/// Validates a collision rate in 1/ps. Zero disables the bath coupling.
pub(crate) fn checked_collision_rate(collision_rate: f64) -> Result<f64, IntegratorError> {
    if !(collision_rate.is_finite() && collision_rate >= 0.0) {
        return Err(IntegratorError::configuration(
            "negative-collision-rate",
            "collision_rate",
            collision_rate,
            "collision rate must be finite and non-negative",
        ));
    }
    Ok(collision_rate)
}

/// Validates the number of inner steps per trial.
pub(crate) fn checked_nsteps(nsteps: usize) -> Result<usize, IntegratorError> {
    if nsteps == 0 {
        return Err(IntegratorError::configuration(
            "non-positive-nsteps",
            "nsteps",
            nsteps,
            "at least one inner step is required per trial",
        ));
    }
    Ok(nsteps)
}

/// Velocity retention factor `b = exp(-gamma * dt)`.
pub fn velocity_mixing(collision_rate: f64, timestep: f64) -> f64 {
    (-collision_rate * timestep).exp()
}
