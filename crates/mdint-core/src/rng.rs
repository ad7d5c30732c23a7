//! Deterministic RNG wrapper and seed-derivation helpers.

use std::f64::consts::PI;
use std::hash::Hasher;

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use siphasher::sip::SipHasher13;

/// Deterministic RNG handle used by engines to serve random draws.
///
/// The handle is a thin wrapper around `StdRng`. A master `seed: u64` must be
/// provided by the caller. Substreams are derived by hashing
/// `(master_seed, substream_id)` with SipHash-1-3 configured with fixed zero
/// keys, so independent engines (replicas, repeated runs) can be seeded
/// reproducibly from a single master seed.
#[derive(Debug, Clone)]
pub struct RngHandle {
    rng: StdRng,
}

impl RngHandle {
    /// Creates a new RNG handle from a master seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Creates the handle for substream `substream` of `master_seed`.
    pub fn substream(master_seed: u64, substream: u64) -> Self {
        Self::from_seed(derive_substream_seed(master_seed, substream))
    }

    /// Uniform draw on `[0, 1)`.
    pub fn uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Standard normal draw using the Box-Muller transform.
    pub fn gaussian(&mut self) -> f64 {
        // 1 - u keeps the logarithm argument in (0, 1].
        let u1 = 1.0 - self.rng.gen::<f64>();
        let u2 = self.rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    /// Fills `out` with independent standard normal draws.
    pub fn fill_gaussian(&mut self, out: &mut [f64]) {
        for value in out.iter_mut() {
            *value = self.gaussian();
        }
    }
}

impl RngCore for RngHandle {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

/// Derives the deterministic seed for a specific substream.
pub fn derive_substream_seed(master_seed: u64, substream: u64) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write_u64(master_seed);
    hasher.write_u64(substream);
    hasher.finish()
}
