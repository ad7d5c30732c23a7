use serde::{Deserialize, Serialize};

/// Accept/reject counters for Metropolized integrators.
///
/// `ntrials` grows by one on every trial regardless of outcome, so
/// `naccept <= ntrials` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegratorStatistics {
    naccept: u64,
    ntrials: u64,
}

impl IntegratorStatistics {
    /// Zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome of one trial.
    pub fn record(&mut self, accepted: bool) {
        self.naccept += u64::from(accepted);
        self.ntrials += 1;
    }

    /// Accepted trials.
    pub fn naccept(&self) -> u64 {
        self.naccept
    }

    /// Attempted trials.
    pub fn ntrials(&self) -> u64 {
        self.ntrials
    }

    /// `naccept / ntrials`, or `None` before the first trial.
    pub fn acceptance_rate(&self) -> Option<f64> {
        if self.ntrials == 0 {
            None
        } else {
            Some(self.naccept as f64 / self.ntrials as f64)
        }
    }
}
