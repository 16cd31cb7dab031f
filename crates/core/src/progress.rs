//! Pipeline progress derived from a snapshot.
//!
//! The backend runs retrieval, claim extraction, evidence search and the
//! final assessment in sequence. While a job is running, each stage is
//! considered done once the payload carries its output.

use serde::Serialize;

use crate::analysis::{AnalysisSnapshot, AnalysisStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    DocumentRetrieval,
    ClaimsExtraction,
    EvidenceSearch,
    Assessment,
}

impl PipelineStage {
    pub const ALL: [PipelineStage; 4] = [
        Self::DocumentRetrieval,
        Self::ClaimsExtraction,
        Self::EvidenceSearch,
        Self::Assessment,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::DocumentRetrieval => "Document Retrieval",
            Self::ClaimsExtraction => "Claims Extraction",
            Self::EvidenceSearch => "Evidence Search",
            Self::Assessment => "AI Analysis",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageState {
    Pending,
    Running,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageProgress {
    pub stage: PipelineStage,
    pub state: StageState,
    /// Items the stage has produced so far.
    pub item_count: usize,
}

/// Progress of every pipeline stage, in execution order.
///
/// - `failed`: every stage is pending.
/// - `completed`: every stage is completed.
/// - `running`: a stage is completed once it has produced items; the
///   assessment stage stays running until the job completes.
pub fn stage_progress(snapshot: &AnalysisSnapshot) -> Vec<StageProgress> {
    PipelineStage::ALL
        .iter()
        .map(|&stage| {
            let item_count = item_count(snapshot, stage);
            let state = match snapshot.status() {
                AnalysisStatus::Failed => StageState::Pending,
                AnalysisStatus::Completed => StageState::Completed,
                AnalysisStatus::Running if stage == PipelineStage::Assessment => {
                    StageState::Running
                }
                AnalysisStatus::Running if item_count > 0 => StageState::Completed,
                AnalysisStatus::Running => StageState::Running,
            };
            StageProgress {
                stage,
                state,
                item_count,
            }
        })
        .collect()
}

fn item_count(snapshot: &AnalysisSnapshot, stage: PipelineStage) -> usize {
    match stage {
        PipelineStage::DocumentRetrieval => snapshot.retrieved_docs().len(),
        PipelineStage::ClaimsExtraction => snapshot.extracted_claims().len(),
        PipelineStage::EvidenceSearch => snapshot.search_queries().len(),
        PipelineStage::Assessment => usize::from(snapshot.status() == AnalysisStatus::Completed),
    }
}
