//! Domain model for sustainability-claim analyses.
//!
//! Holds the canonical [`AnalysisSnapshot`](analysis::AnalysisSnapshot)
//! record, the payload normalizer that builds it from loosely-typed
//! backend responses, and the pure derived views (claim statistics,
//! evidence grouping, progress stages, concern level) computed from it.

pub mod analysis;
pub mod error;
pub mod evidence;
pub mod job;
pub mod normalize;
pub mod progress;
pub mod report;
pub mod score;
pub mod stats;
