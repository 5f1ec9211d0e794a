//! Three-valued thought classification and the verdict record.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Viability classification of a thought.
///
/// `Pending` is the state of a node that has not been evaluated yet. An
/// evaluator never produces it; see [`Verdict::sanitized`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Evaluation {
    Pending,
    Sure,
    Maybe,
    Impossible,
}

impl Evaluation {
    /// Additive bonus used by fallback scoring.
    #[must_use]
    pub fn bonus(self) -> f64 {
        match self {
            Self::Sure => 0.5,
            Self::Impossible => -0.5,
            Self::Maybe | Self::Pending => 0.0,
        }
    }

    /// Whether a node with this evaluation may enter a frontier.
    #[must_use]
    pub fn is_viable(self) -> bool {
        matches!(self, Self::Sure | Self::Maybe)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sure => "sure",
            Self::Maybe => "maybe",
            Self::Impossible => "impossible",
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Evaluation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "sure" => Ok(Self::Sure),
            "maybe" => Ok(Self::Maybe),
            "impossible" => Ok(Self::Impossible),
            other => Err(format!("unknown evaluation: {other}")),
        }
    }
}

/// Reasoning recorded when an evaluator gave no usable answer.
pub const DEGRADED_REASONING: &str = "evaluation unavailable; defaulting to maybe";

/// An evaluator's classification of one thought.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub evaluation: Evaluation,
    /// Certainty in `[0, 1]`.
    pub confidence: f64,
    pub reasoning: String,
}

impl Verdict {
    /// Confidence assigned when the evaluator output is unusable.
    pub const DEFAULT_CONFIDENCE: f64 = 0.5;

    /// Build a verdict, clamping `confidence` into `[0, 1]`.
    #[must_use]
    pub fn new(evaluation: Evaluation, confidence: f64, reasoning: impl Into<String>) -> Self {
        Self {
            evaluation,
            confidence: clamp_confidence(confidence),
            reasoning: reasoning.into(),
        }
    }

    /// The documented fallback: `maybe` at 0.5 confidence.
    #[must_use]
    pub fn degraded() -> Self {
        Self {
            evaluation: Evaluation::Maybe,
            confidence: Self::DEFAULT_CONFIDENCE,
            reasoning: DEGRADED_REASONING.to_string(),
        }
    }

    /// Coerce an untrusted verdict into one the tree accepts.
    ///
    /// A `pending` classification becomes the degraded default; confidence is
    /// clamped and NaN is replaced by the default confidence.
    #[must_use]
    pub fn sanitized(self) -> Self {
        if self.evaluation == Evaluation::Pending {
            return Self::degraded();
        }
        Self {
            confidence: clamp_confidence(self.confidence),
            ..self
        }
    }
}

impl Default for Verdict {
    fn default() -> Self {
        Self::degraded()
    }
}

fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        Verdict::DEFAULT_CONFIDENCE
    } else {
        confidence.clamp(0.0, 1.0)
    }
}
