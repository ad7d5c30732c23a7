#![deny(missing_docs)]
#![doc = "Engine contract, structured errors and deterministic RNG shared by the mdint crates."]

pub mod engine;
pub mod errors;
pub mod reference;
pub mod rng;
pub mod units;

pub use engine::DynamicsEngine;
pub use errors::{ErrorInfo, IntegratorError};
pub use reference::{HarmonicPotential, Potential, ReferenceEngine};
pub use rng::{derive_substream_seed, RngHandle};
pub use units::{thermal_energy, BOLTZMANN_KJ_PER_MOL_K};
