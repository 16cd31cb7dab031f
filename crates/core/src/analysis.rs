//! Canonical analysis records.
//!
//! [`AnalysisSnapshot`] is the normalized view of a job at one poll tick.
//! Snapshots are only built by [`crate::normalize::normalize`], which
//! upholds the invariant that `error` is present iff the status is
//! [`AnalysisStatus::Failed`].

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::evidence::EvidenceItem;
use crate::stats::ClaimStats;

// ---------------------------------------------------------------------------
// Status enums
// ---------------------------------------------------------------------------

/// Lifecycle status reported by the backend for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Running,
    Completed,
    Failed,
}

impl AnalysisStatus {
    /// Parse a backend status string (case-insensitive).
    ///
    /// Returns `None` for anything unrecognized; callers decide the fallback.
    pub fn from_raw(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Whether polling stops once this status is observed.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Per-claim verification outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ClaimStatus {
    Verified,
    Contradicted,
    Unsubstantiated,
    Error,
}

impl ClaimStatus {
    /// Parse a verdict string (case-insensitive). Unknown values map to
    /// [`ClaimStatus::Error`].
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "verified" => Self::Verified,
            "contradicted" => Self::Contradicted,
            "unsubstantiated" => Self::Unsubstantiated,
            _ => Self::Error,
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// The backend's verdict on one sustainability claim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimVerdict {
    pub claim: String,
    pub synthesis: String,
    pub status: ClaimStatus,
}

/// A claim as extracted from the company's own reports, before verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedClaim {
    pub text: String,
    /// Where in the source material the claim was found.
    pub reference: Option<String>,
}

/// A report excerpt retrieved from the backend's document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetrievedDoc {
    pub page_content: String,
    pub source: Option<String>,
    /// Page label; numeric pages are rendered as strings.
    pub page: Option<String>,
}

/// Normalized view of an analysis job at one poll tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSnapshot {
    pub(crate) status: AnalysisStatus,
    pub(crate) claims: Vec<ClaimVerdict>,
    pub(crate) evidence_by_claim: IndexMap<String, Vec<EvidenceItem>>,
    pub(crate) score: Option<f64>,
    pub(crate) summary: Option<String>,
    pub(crate) themes: IndexSet<String>,
    pub(crate) error: Option<String>,
    pub(crate) extracted_claims: Vec<ExtractedClaim>,
    pub(crate) search_queries: Vec<String>,
    pub(crate) retrieved_docs: Vec<RetrievedDoc>,
}

impl AnalysisSnapshot {
    pub fn status(&self) -> AnalysisStatus {
        self.status
    }

    /// Claim verdicts in backend order.
    pub fn claims(&self) -> &[ClaimVerdict] {
        &self.claims
    }

    /// Evidence grouped by claim text, in first-seen order.
    pub fn evidence_by_claim(&self) -> &IndexMap<String, Vec<EvidenceItem>> {
        &self.evidence_by_claim
    }

    /// Evidence for a single claim, if any was gathered.
    pub fn evidence_for(&self, claim_text: &str) -> Option<&[EvidenceItem]> {
        self.evidence_by_claim.get(claim_text).map(Vec::as_slice)
    }

    /// Greenwash score on the 0-10 scale. Only meaningful once completed.
    pub fn score(&self) -> Option<f64> {
        self.score
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn themes(&self) -> &IndexSet<String> {
        &self.themes
    }

    /// Backend failure reason. Present iff the status is `failed`.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn extracted_claims(&self) -> &[ExtractedClaim] {
        &self.extracted_claims
    }

    pub fn search_queries(&self) -> &[String] {
        &self.search_queries
    }

    pub fn retrieved_docs(&self) -> &[RetrievedDoc] {
        &self.retrieved_docs
    }

    /// Verdict counts, computed from [`Self::claims`] on every call.
    pub fn claim_stats(&self) -> ClaimStats {
        ClaimStats::from_claims(&self.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_status_parses_case_insensitively() {
        assert_eq!(AnalysisStatus::from_raw("running"), Some(AnalysisStatus::Running));
        assert_eq!(AnalysisStatus::from_raw(" Completed "), Some(AnalysisStatus::Completed));
        assert_eq!(AnalysisStatus::from_raw("FAILED"), Some(AnalysisStatus::Failed));
        assert_eq!(AnalysisStatus::from_raw("queued"), None);
    }

    #[test]
    fn only_running_is_non_terminal() {
        assert!(!AnalysisStatus::Running.is_terminal());
        assert!(AnalysisStatus::Completed.is_terminal());
        assert!(AnalysisStatus::Failed.is_terminal());
    }

    #[test]
    fn claim_status_unknown_maps_to_error() {
        assert_eq!(ClaimStatus::from_raw("Verified"), ClaimStatus::Verified);
        assert_eq!(ClaimStatus::from_raw("contradicted"), ClaimStatus::Contradicted);
        assert_eq!(ClaimStatus::from_raw("Unsubstantiated"), ClaimStatus::Unsubstantiated);
        assert_eq!(ClaimStatus::from_raw("Partially true"), ClaimStatus::Error);
        assert_eq!(ClaimStatus::from_raw(""), ClaimStatus::Error);
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_value(AnalysisStatus::Completed).unwrap();
        assert_eq!(json, "completed");
        assert_eq!(AnalysisStatus::Failed.as_str(), "failed");
    }
}
