//! Serializable report combining a snapshot with its derived views.

use serde::Serialize;

use crate::analysis::{AnalysisSnapshot, AnalysisStatus, ClaimVerdict};
use crate::evidence::{summarize_groups, EvidenceGroupSummary};
use crate::progress::{stage_progress, StageProgress};
use crate::score::ConcernLevel;
use crate::stats::ClaimStats;

/// Everything a consumer needs to present one analysis result.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport<'a> {
    pub status: AnalysisStatus,
    pub score: Option<f64>,
    pub concern: Option<ConcernLevel>,
    pub summary: Option<&'a str>,
    pub error: Option<&'a str>,
    pub themes: Vec<&'a str>,
    pub stats: ClaimStats,
    pub claims: &'a [ClaimVerdict],
    pub evidence: Vec<EvidenceGroupSummary>,
    pub progress: Vec<StageProgress>,
}

impl<'a> AnalysisReport<'a> {
    pub fn from_snapshot(snapshot: &'a AnalysisSnapshot) -> Self {
        // Score and summary are only meaningful for completed analyses.
        let completed = snapshot.status() == AnalysisStatus::Completed;
        let score = snapshot.score().filter(|_| completed);

        Self {
            status: snapshot.status(),
            score,
            concern: score.map(ConcernLevel::from_score),
            summary: snapshot.summary().filter(|_| completed),
            error: snapshot.error(),
            themes: snapshot.themes().iter().map(String::as_str).collect(),
            stats: snapshot.claim_stats(),
            claims: snapshot.claims(),
            evidence: summarize_groups(snapshot.evidence_by_claim()),
            progress: stage_progress(snapshot),
        }
    }
}
