//! Greenwash score scale and concern banding.

use serde::Serialize;

/// Upper bound of the backend's greenwash score scale.
pub const GREENWASH_SCORE_MAX: f64 = 10.0;

/// Scores below this are [`ConcernLevel::Low`].
const MODERATE_THRESHOLD: f64 = 3.0;
/// Scores below this (and at least moderate) are [`ConcernLevel::Moderate`].
const HIGH_THRESHOLD: f64 = 6.0;
/// Scores at or above this are [`ConcernLevel::Critical`].
const CRITICAL_THRESHOLD: f64 = 8.0;

/// How worrying a greenwash score is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcernLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl ConcernLevel {
    /// Band a 0-10 greenwash score. Out-of-range values are clamped.
    pub fn from_score(score: f64) -> Self {
        let score = score.clamp(0.0, GREENWASH_SCORE_MAX);
        if score < MODERATE_THRESHOLD {
            Self::Low
        } else if score < HIGH_THRESHOLD {
            Self::Moderate
        } else if score < CRITICAL_THRESHOLD {
            Self::High
        } else {
            Self::Critical
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low concern",
            Self::Moderate => "Moderate concern",
            Self::High => "High concern",
            Self::Critical => "Critical concern",
        }
    }
}
