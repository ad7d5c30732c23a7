use serde::{Deserialize, Serialize};

/// Named scalar registers written by bookkeeping instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Register {
    /// Kinetic energy before a velocity update.
    OldKe,
    /// Kinetic energy after a velocity update.
    NewKe,
    /// Potential energy before a drift.
    OldPe,
    /// Potential energy after a drift.
    NewPe,
    /// Accumulated shadow work.
    ShadowWork,
    /// Accumulated heat exchanged with the bath.
    Heat,
}

impl Register {
    fn index(self) -> usize {
        match self {
            Register::OldKe => 0,
            Register::NewKe => 1,
            Register::OldPe => 2,
            Register::NewPe => 3,
            Register::ShadowWork => 4,
            Register::Heat => 5,
        }
    }

    /// Register name as used in logs and serialized output.
    pub fn name(&self) -> &'static str {
        match self {
            Register::OldKe => "old_ke",
            Register::NewKe => "new_ke",
            Register::OldPe => "old_pe",
            Register::NewPe => "new_pe",
            Register::ShadowWork => "shadow_work",
            Register::Heat => "heat",
        }
    }
}

/// Which bookkeeping accumulators are maintained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Monitoring {
    /// Accumulate shadow work from Drift and Kick sub-steps.
    #[serde(default)]
    pub work: bool,
    /// Accumulate heat from the Stochastic sub-step.
    #[serde(default)]
    pub heat: bool,
}

impl Monitoring {
    /// Monitoring disabled.
    pub const OFF: Monitoring = Monitoring {
        work: false,
        heat: false,
    };

    /// True when either accumulator is active.
    pub fn any(&self) -> bool {
        self.work || self.heat
    }
}

/// Register file owned by an integrator instance.
///
/// Values persist across step calls and are only cleared by [`reset`].
///
/// [`reset`]: BookkeepingLedger::reset
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BookkeepingLedger {
    monitoring: Monitoring,
    values: [f64; 6],
}

impl BookkeepingLedger {
    /// Creates a zeroed ledger.
    pub fn new(monitoring: Monitoring) -> Self {
        Self {
            monitoring,
            values: [0.0; 6],
        }
    }

    /// Active monitoring flags.
    pub fn monitoring(&self) -> Monitoring {
        self.monitoring
    }

    /// Raw register value.
    pub fn get(&self, register: Register) -> f64 {
        self.values[register.index()]
    }

    pub(crate) fn set(&mut self, register: Register, value: f64) {
        self.values[register.index()] = value;
    }

    pub(crate) fn accumulate(&mut self, target: Register, increment: Register, decrement: Register) {
        let delta = self.get(increment) - self.get(decrement);
        self.values[target.index()] += delta;
    }

    /// Accumulated shadow work, if work monitoring is on.
    pub fn shadow_work(&self) -> Option<f64> {
        self.monitoring
            .work
            .then(|| self.get(Register::ShadowWork))
    }

    /// Accumulated heat, if heat monitoring is on.
    pub fn heat(&self) -> Option<f64> {
        self.monitoring.heat.then(|| self.get(Register::Heat))
    }

    /// Clears every register.
    pub fn reset(&mut self) {
        self.values = [0.0; 6];
    }
}
