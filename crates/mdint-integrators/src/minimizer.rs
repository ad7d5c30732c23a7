use mdint_core::{DynamicsEngine, IntegratorError};
use tracing::{debug, trace};

use crate::integrator::{checked_timestep, drive, Integrator};
use crate::stats::IntegratorStatistics;

/// Gradient descent with an adaptive step length, driven like an integrator.
///
/// Each step moves along the normalized force by the current step size and
/// keeps the move only if the potential energy did not increase. The step
/// size doubles after an accepted move and halves after a rejected one.
#[derive(Debug, Clone)]
pub struct GradientDescentMinimizer {
    step_size: f64,
    timestep: f64,
    statistics: IntegratorStatistics,
    saved_positions: Vec<f64>,
    direction: Vec<f64>,
}

impl GradientDescentMinimizer {
    /// Minimizer with an initial step norm of `initial_step_size` nm.
    /// `timestep` is the fictitious clock increment per step.
    pub fn new(initial_step_size: f64, timestep: f64) -> Result<Self, IntegratorError> {
        if !(initial_step_size.is_finite() && initial_step_size > 0.0) {
            return Err(IntegratorError::configuration(
                "non-positive-step-size",
                "initial_step_size",
                initial_step_size,
                "initial step size must be finite and positive",
            ));
        }
        let timestep = checked_timestep(timestep)?;
        debug!(initial_step_size, timestep, "constructed gradient descent minimizer");
        Ok(Self {
            step_size: initial_step_size,
            timestep,
            statistics: IntegratorStatistics::new(),
            saved_positions: Vec::new(),
            direction: Vec::new(),
        })
    }

    /// Current step norm in nm.
    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    fn descend(&mut self, engine: &mut dyn DynamicsEngine) {
        engine.project_positions();
        let energy_old = engine.potential_energy();
        self.saved_positions.clear();
        self.saved_positions.extend_from_slice(engine.positions());

        self.direction.clear();
        self.direction.extend_from_slice(engine.forces());
        let norm2: f64 = self.direction.iter().map(|f| f * f).sum();
        // Zero forces leave positions unchanged instead of dividing by zero.
        let scale = if norm2 == 0.0 {
            self.step_size
        } else {
            self.step_size / norm2.sqrt()
        };
        for (x, f) in engine.positions_mut().iter_mut().zip(&self.direction) {
            *x += scale * f;
        }
        engine.project_positions();

        let energy_new = engine.potential_energy();
        let delta_energy = energy_new - energy_old;
        let accepted = delta_energy.is_finite() && delta_energy <= 0.0;
        if accepted {
            self.step_size *= 2.0;
        } else {
            engine.positions_mut().copy_from_slice(&self.saved_positions);
            self.step_size *= 0.5;
        }
        self.statistics.record(accepted);
        trace!(delta_energy, accepted, step_size = self.step_size, "descent step");
    }
}

impl Integrator for GradientDescentMinimizer {
    fn name(&self) -> &'static str {
        "gradient-descent"
    }

    fn timestep(&self) -> f64 {
        self.timestep
    }

    fn step(&mut self, engine: &mut dyn DynamicsEngine, steps: usize) {
        let timestep = self.timestep;
        drive(engine, steps, timestep, |engine| self.descend(engine));
    }

    fn statistics(&self) -> Option<&IntegratorStatistics> {
        Some(&self.statistics)
    }
}
