use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_PRIOR: f64 = 0.3;
pub const DEFAULT_LEARN_RATE: f64 = 0.1;
pub const DEFAULT_GUESS: f64 = 0.2;
pub const DEFAULT_SLIP: f64 = 0.1;

/// Mastery is kept inside [MASTERY_FLOOR, MASTERY_CEILING]. The recurrence
/// never reaches 0 or 1 exactly, but f64 rounding does after a few dozen
/// consistent answers.
pub const MASTERY_FLOOR: f64 = 1e-6;
pub const MASTERY_CEILING: f64 = 1.0 - 1e-6;

/// Bayesian Knowledge Tracing parameters shared by every topic.
///
/// All four values must lie strictly inside (0, 1). [`BktParameters::validate`]
/// enforces this, and the store refuses to be built from parameters that fail
/// it, so the update functions below never see a zero denominator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BktParameters {
    /// P(L0): mastery assumed for a topic never seen before
    pub prior: f64,
    /// P(T): chance of moving from unknown to known per opportunity
    pub learn_rate: f64,
    /// P(G): chance an unmastered topic is answered correctly
    pub guess: f64,
    /// P(S): chance a mastered topic is answered incorrectly
    pub slip: f64,
}

impl Default for BktParameters {
    fn default() -> Self {
        Self {
            prior: DEFAULT_PRIOR,
            learn_rate: DEFAULT_LEARN_RATE,
            guess: DEFAULT_GUESS,
            slip: DEFAULT_SLIP,
        }
    }
}

impl BktParameters {
    pub fn new(prior: f64, learn_rate: f64, guess: f64, slip: f64) -> Result<Self> {
        let params = Self {
            prior,
            learn_rate,
            guess,
            slip,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("prior", self.prior),
            ("learn_rate", self.learn_rate),
            ("guess", self.guess),
            ("slip", self.slip),
        ];
        for (name, value) in fields {
            // NaN fails both comparisons
            if !(value > 0.0 && value < 1.0) {
                return Err(Error::Configuration { name, value });
            }
        }
        Ok(())
    }
}

/// Result of applying one observation to a mastery estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    /// Posterior after conditioning on the observation, before learning
    pub evidence: f64,
    /// Posterior after the learning transition; this is the new mastery
    pub mastery: f64,
}

/// Conditions `mastery` on one observed response.
pub fn evidence_update(params: &BktParameters, mastery: f64, is_correct: bool) -> f64 {
    let known = 1.0 - mastery;
    if is_correct {
        let hit = mastery * (1.0 - params.slip);
        hit / (hit + known * params.guess)
    } else {
        let miss = mastery * params.slip;
        miss / (miss + known * (1.0 - params.guess))
    }
}

/// Applies the unknown-to-known transition. Never lowers mastery.
pub fn learning_update(params: &BktParameters, mastery: f64) -> f64 {
    mastery + (1.0 - mastery) * params.learn_rate
}

/// Evidence update followed by the learning transition, both clamped.
pub fn step(params: &BktParameters, mastery: f64, is_correct: bool) -> Step {
    let evidence =
        evidence_update(params, mastery, is_correct).clamp(MASTERY_FLOOR, MASTERY_CEILING);
    Step {
        evidence,
        mastery: learning_update(params, evidence).clamp(MASTERY_FLOOR, MASTERY_CEILING),
    }
}
