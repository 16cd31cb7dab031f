//! Evidence items and the per-claim views derived from them.

use indexmap::IndexMap;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Weight tiers
// ---------------------------------------------------------------------------

/// Minimum weight for a [`WeightTier::High`] source (company reports).
pub const HIGH_WEIGHT_THRESHOLD: f64 = 3.0;
/// Minimum weight for a [`WeightTier::Medium`] source (general web results).
pub const MEDIUM_WEIGHT_THRESHOLD: f64 = 2.0;

/// Coarse credibility bucket for an evidence weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum WeightTier {
    Low,
    Medium,
    High,
}

impl WeightTier {
    pub fn from_weight(weight: f64) -> Self {
        if weight >= HIGH_WEIGHT_THRESHOLD {
            Self::High
        } else if weight >= MEDIUM_WEIGHT_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Where a piece of evidence came from, judged from its source string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// A report or PDF document.
    Document,
    /// A web page.
    Web,
    /// Anything else, typically a bare search result label.
    Search,
}

impl SourceKind {
    pub fn classify(source: &str) -> Self {
        if source.contains("report") || source.contains("pdf") {
            Self::Document
        } else if source.contains("http") {
            Self::Web
        } else {
            Self::Search
        }
    }
}

// ---------------------------------------------------------------------------
// Evidence item
// ---------------------------------------------------------------------------

/// A single retrieved snippet bearing on one claim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvidenceItem {
    pub claim_text: String,
    pub snippet: Option<String>,
    pub source: Option<String>,
    pub weight: f64,
    pub note: Option<String>,
}

impl EvidenceItem {
    /// True when the item carries both a snippet and a source.
    ///
    /// Placeholder items (e.g. "no results found") have neither.
    pub fn is_substantive(&self) -> bool {
        self.snippet.is_some() && self.source.is_some()
    }

    pub fn tier(&self) -> WeightTier {
        WeightTier::from_weight(self.weight)
    }

    pub fn source_kind(&self) -> Option<SourceKind> {
        self.source.as_deref().map(SourceKind::classify)
    }
}

/// Group a flat evidence list by claim text.
///
/// Groups appear in the order their claim was first seen and items keep
/// their original relative order within a group.
pub fn group_by_claim(
    items: impl IntoIterator<Item = EvidenceItem>,
) -> IndexMap<String, Vec<EvidenceItem>> {
    let mut groups: IndexMap<String, Vec<EvidenceItem>> = IndexMap::new();
    for item in items {
        groups.entry(item.claim_text.clone()).or_default().push(item);
    }
    groups
}

// ---------------------------------------------------------------------------
// Group summaries
// ---------------------------------------------------------------------------

/// Aggregate view of the evidence gathered for one claim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvidenceGroupSummary {
    pub claim_text: String,
    pub item_count: usize,
    pub substantive_count: usize,
    pub max_weight: Option<f64>,
    pub top_tier: Option<WeightTier>,
}

impl EvidenceGroupSummary {
    pub fn from_group(claim_text: &str, items: &[EvidenceItem]) -> Self {
        let max_weight = items.iter().map(|item| item.weight).reduce(f64::max);
        Self {
            claim_text: claim_text.to_string(),
            item_count: items.len(),
            substantive_count: items.iter().filter(|item| item.is_substantive()).count(),
            max_weight,
            top_tier: max_weight.map(WeightTier::from_weight),
        }
    }

    pub fn has_evidence(&self) -> bool {
        self.substantive_count > 0
    }
}

/// Summarize every group, preserving group order.
pub fn summarize_groups(groups: &IndexMap<String, Vec<EvidenceItem>>) -> Vec<EvidenceGroupSummary> {
    groups
        .iter()
        .map(|(claim_text, items)| EvidenceGroupSummary::from_group(claim_text, items))
        .collect()
}
