use std::fs;
use std::path::Path;

use mdint_core::errors::ErrorInfo;
use mdint_core::units::angstroms;
use mdint_core::IntegratorError;
use serde::{Deserialize, Serialize};

use crate::integrator::Integrator;
use crate::langevin::{
    default_collision_rate, default_temperature, default_timestep, LangevinSplittingConfig,
    LangevinSplittingIntegrator,
};
use crate::metropolis::MetropolizedIntegrator;
use crate::minimizer::GradientDescentMinimizer;
use crate::templates::TemplateIntegrator;

/// YAML-configurable choice of integrator family and its parameters.
///
/// Temperatures are in K, times in ps, lengths in nm and rates in 1/ps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum IntegratorConfig {
    /// Langevin dynamics from an `A`/`B`/`O` splitting.
    LangevinSplitting(LangevinSplittingConfig),
    /// Velocity Verlet.
    VelocityVerlet {
        /// Integration timestep.
        #[serde(default = "default_timestep")]
        timestep: f64,
    },
    /// Velocity Verlet with Andersen collisions.
    AndersenVelocityVerlet {
        /// Bath temperature.
        #[serde(default = "default_temperature")]
        temperature: f64,
        /// Collision rate.
        #[serde(default = "default_collision_rate")]
        collision_rate: f64,
        /// Integration timestep.
        #[serde(default = "default_timestep")]
        timestep: f64,
    },
    /// Velocity Verlet with velocity randomization.
    Vvvr {
        /// Bath temperature.
        #[serde(default = "default_temperature")]
        temperature: f64,
        /// Collision rate.
        #[serde(default = "default_collision_rate")]
        collision_rate: f64,
        /// Integration timestep.
        #[serde(default = "default_timestep")]
        timestep: f64,
    },
    /// Metropolis Monte Carlo with Gaussian displacements.
    MetropolisMonteCarlo {
        /// Bath temperature.
        #[serde(default = "default_temperature")]
        temperature: f64,
        /// Displacement width.
        #[serde(default = "default_sigma")]
        sigma: f64,
        /// Clock increment per trial.
        #[serde(default = "default_timestep")]
        timestep: f64,
    },
    /// Hybrid Monte Carlo.
    Hmc {
        /// Bath temperature.
        #[serde(default = "default_temperature")]
        temperature: f64,
        /// Velocity Verlet steps per trial.
        #[serde(default = "default_hmc_nsteps")]
        nsteps: usize,
        /// Integration timestep.
        #[serde(default = "default_timestep")]
        timestep: f64,
    },
    /// Generalized HMC.
    Ghmc {
        /// Bath temperature.
        #[serde(default = "default_temperature")]
        temperature: f64,
        /// Collision rate.
        #[serde(default = "default_collision_rate")]
        collision_rate: f64,
        /// Integration timestep.
        #[serde(default = "default_timestep")]
        timestep: f64,
        /// Velocity Verlet steps per trial.
        #[serde(default = "default_ghmc_nsteps")]
        nsteps: usize,
    },
    /// Adaptive gradient descent.
    GradientDescent {
        /// Initial step norm.
        #[serde(default = "default_initial_step_size")]
        initial_step_size: f64,
        /// Fictitious clock increment.
        #[serde(default = "default_timestep")]
        timestep: f64,
    },
    /// Constraint projection only.
    Dummy,
}

fn default_sigma() -> f64 {
    angstroms(0.1)
}

fn default_hmc_nsteps() -> usize {
    10
}

fn default_ghmc_nsteps() -> usize {
    1
}

fn default_initial_step_size() -> f64 {
    angstroms(0.01)
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        IntegratorConfig::LangevinSplitting(LangevinSplittingConfig::default())
    }
}

fn serde_error(code: &str, err: impl ToString) -> IntegratorError {
    IntegratorError::Serde(ErrorInfo::new(code, err.to_string()))
}

impl IntegratorConfig {
    /// Parses a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self, IntegratorError> {
        serde_yaml::from_str(text).map_err(|err| serde_error("config-parse", err))
    }

    /// Reads and parses a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, IntegratorError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| {
            IntegratorError::Serde(
                ErrorInfo::new("config-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        Self::from_yaml_str(&text).map_err(|err| match err {
            IntegratorError::Serde(info) => IntegratorError::Serde(
                info.with_context("path", path.display().to_string()),
            ),
            other => other,
        })
    }

    /// Serializes to YAML.
    pub fn to_yaml_string(&self) -> Result<String, IntegratorError> {
        serde_yaml::to_string(self).map_err(|err| serde_error("config-serialize", err))
    }

    /// Constructs the configured integrator.
    pub fn build(&self) -> Result<Box<dyn Integrator>, IntegratorError> {
        let integrator: Box<dyn Integrator> = match *self {
            IntegratorConfig::LangevinSplitting(ref config) => {
                Box::new(LangevinSplittingIntegrator::new(config)?)
            }
            IntegratorConfig::VelocityVerlet { timestep } => {
                Box::new(TemplateIntegrator::velocity_verlet(timestep)?)
            }
            IntegratorConfig::AndersenVelocityVerlet {
                temperature,
                collision_rate,
                timestep,
            } => Box::new(TemplateIntegrator::andersen(
                temperature,
                collision_rate,
                timestep,
            )?),
            IntegratorConfig::Vvvr {
                temperature,
                collision_rate,
                timestep,
            } => Box::new(TemplateIntegrator::vvvr(temperature, collision_rate, timestep)?),
            IntegratorConfig::MetropolisMonteCarlo {
                temperature,
                sigma,
                timestep,
            } => Box::new(MetropolizedIntegrator::metropolis_monte_carlo(
                temperature,
                sigma,
                timestep,
            )?),
            IntegratorConfig::Hmc {
                temperature,
                nsteps,
                timestep,
            } => Box::new(MetropolizedIntegrator::hmc(temperature, nsteps, timestep)?),
            IntegratorConfig::Ghmc {
                temperature,
                collision_rate,
                timestep,
                nsteps,
            } => Box::new(MetropolizedIntegrator::ghmc(
                temperature,
                collision_rate,
                timestep,
                nsteps,
            )?),
            IntegratorConfig::GradientDescent {
                initial_step_size,
                timestep,
            } => Box::new(GradientDescentMinimizer::new(initial_step_size, timestep)?),
            IntegratorConfig::Dummy => Box::new(TemplateIntegrator::dummy()),
        };
        Ok(integrator)
    }
}
