use std::fmt;
use std::str::FromStr;

use mdint_core::errors::ErrorInfo;
use mdint_core::IntegratorError;
use serde::{Deserialize, Serialize};

/// Elementary sub-update of a Langevin splitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StepKind {
    /// `A`: deterministic position update from velocities.
    Drift,
    /// `B`: deterministic velocity update from forces.
    Kick,
    /// `O`: Ornstein-Uhlenbeck velocity update against the bath.
    Stochastic,
}

impl StepKind {
    /// Parses a single scheme symbol, ignoring case.
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol.to_ascii_uppercase() {
            'A' => Some(StepKind::Drift),
            'B' => Some(StepKind::Kick),
            'O' => Some(StepKind::Stochastic),
            _ => None,
        }
    }

    /// Canonical upper-case symbol.
    pub fn symbol(&self) -> char {
        match self {
            StepKind::Drift => 'A',
            StepKind::Kick => 'B',
            StepKind::Stochastic => 'O',
        }
    }

    /// True for the kinds that update velocities.
    pub fn updates_velocities(&self) -> bool {
        matches!(self, StepKind::Kick | StepKind::Stochastic)
    }
}

/// Validated, ordered splitting such as `BAOAB` or `ABO`.
///
/// Order is significant: `ABO` and `BAOAB` contain the same kinds but are
/// different discretisations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SplittingScheme {
    steps: Vec<StepKind>,
}

impl SplittingScheme {
    /// Parses a case-insensitive scheme string over `{A, B, O}`.
    ///
    /// Every symbol must appear at least once, nothing else is allowed and the
    /// stochastic `O` step must occur exactly once.
    pub fn parse(text: &str) -> Result<Self, IntegratorError> {
        let mut steps = Vec::with_capacity(text.len());
        for (position, symbol) in text.chars().enumerate() {
            let kind = StepKind::from_symbol(symbol).ok_or_else(|| {
                IntegratorError::InvalidScheme(
                    ErrorInfo::new("unknown-symbol", "scheme symbols must be A, B or O")
                        .with_context("scheme", text)
                        .with_context("symbol", symbol.to_string())
                        .with_context("position", position.to_string()),
                )
            })?;
            steps.push(kind);
        }

        for kind in [StepKind::Drift, StepKind::Kick, StepKind::Stochastic] {
            if !steps.contains(&kind) {
                return Err(IntegratorError::InvalidScheme(
                    ErrorInfo::new("missing-symbol", "scheme must contain each of A, B and O")
                        .with_context("scheme", text)
                        .with_context("missing", kind.symbol().to_string()),
                ));
            }
        }

        let stochastic = steps
            .iter()
            .filter(|kind| **kind == StepKind::Stochastic)
            .count();
        if stochastic != 1 {
            return Err(IntegratorError::InvalidScheme(
                ErrorInfo::new("repeated-stochastic", "the O step may appear only once")
                    .with_context("scheme", text)
                    .with_context("count", stochastic.to_string())
                    .with_hint("splitting the stochastic sub-step is not supported"),
            ));
        }

        Ok(Self { steps })
    }

    /// The `BAOAB` splitting.
    pub fn baoab() -> Self {
        Self {
            steps: vec![
                StepKind::Kick,
                StepKind::Drift,
                StepKind::Stochastic,
                StepKind::Drift,
                StepKind::Kick,
            ],
        }
    }

    /// Ordered step kinds.
    pub fn steps(&self) -> &[StepKind] {
        &self.steps
    }

    /// Number of occurrences of `kind`.
    pub fn count(&self, kind: StepKind) -> usize {
        self.steps.iter().filter(|step| **step == kind).count()
    }

    /// Number of symbols in the scheme.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false for a validated scheme.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Display for SplittingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            write!(f, "{}", step.symbol())?;
        }
        Ok(())
    }
}

impl FromStr for SplittingScheme {
    type Err = IntegratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SplittingScheme {
    type Error = IntegratorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SplittingScheme> for String {
    fn from(scheme: SplittingScheme) -> Self {
        scheme.to_string()
    }
}
