use serde::{Deserialize, Serialize};

use crate::scheme::{SplittingScheme, StepKind};

/// One scheduled sub-step: a kind together with its share of the timestep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Substep {
    /// Kind of update.
    pub kind: StepKind,
    /// Fraction of the full timestep (`1/n_A`, `1/n_B`, or 1 for `O`).
    pub fraction: f64,
    /// Time increment in ps (`fraction * timestep`).
    pub duration: f64,
}

/// Per-kind fractions derived from occurrence counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubstepWeights {
    /// Fraction applied on every Drift.
    pub drift: f64,
    /// Fraction applied on every Kick.
    pub kick: f64,
    /// Fraction applied on the single Stochastic step.
    pub stochastic: f64,
}

impl SubstepWeights {
    /// Weights for `scheme`.
    pub fn for_scheme(scheme: &SplittingScheme) -> Self {
        // A validated scheme holds at least one of each kind.
        let n_drift = scheme.count(StepKind::Drift).max(1);
        let n_kick = scheme.count(StepKind::Kick).max(1);
        Self {
            drift: 1.0 / n_drift as f64,
            kick: 1.0 / n_kick as f64,
            stochastic: 1.0,
        }
    }

    /// Fraction for `kind`.
    pub fn fraction(&self, kind: StepKind) -> f64 {
        match kind {
            StepKind::Drift => self.drift,
            StepKind::Kick => self.kick,
            StepKind::Stochastic => self.stochastic,
        }
    }
}

/// Expands `scheme` into timed sub-steps, preserving order.
///
/// Drift sub-steps last `timestep / n_A` and Kick sub-steps `timestep / n_B`,
/// so each kind covers the full timestep over one pass.
pub fn schedule(scheme: &SplittingScheme, timestep: f64) -> Vec<Substep> {
    let weights = SubstepWeights::for_scheme(scheme);
    scheme
        .steps()
        .iter()
        .map(|&kind| {
            let fraction = weights.fraction(kind);
            let duration = match kind {
                StepKind::Drift => timestep / scheme.count(StepKind::Drift) as f64,
                StepKind::Kick => timestep / scheme.count(StepKind::Kick) as f64,
                StepKind::Stochastic => timestep,
            };
            Substep {
                kind,
                fraction,
                duration,
            }
        })
        .collect()
}

/// Total time covered by the sub-steps of `kind`.
pub fn total_duration(substeps: &[Substep], kind: StepKind) -> f64 {
    substeps
        .iter()
        .filter(|substep| substep.kind == kind)
        .map(|substep| substep.duration)
        .sum()
}
