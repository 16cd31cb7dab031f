//! Status payload normalization.
//!
//! The backend's status endpoint returns a loosely-typed JSON object whose
//! fields appear gradually while the analysis runs and whose shape has
//! drifted between versions. [`normalize`] maps any such payload into a
//! well-formed [`AnalysisSnapshot`]. It never fails: fields that are
//! missing or of the wrong type degrade to absent values or empty
//! collections, because a half-populated in-progress payload is normal.

use indexmap::IndexSet;
use serde_json::{Map, Value};

use crate::analysis::{
    AnalysisSnapshot, AnalysisStatus, ClaimStatus, ClaimVerdict, ExtractedClaim, RetrievedDoc,
};
use crate::evidence::{group_by_claim, EvidenceItem};

/// Untyped status response as received from the backend.
pub type RawStatusPayload = Value;

/// Failure reason used when the backend reports `failed` without one.
pub const UNKNOWN_FAILURE_REASON: &str = "Unknown error occurred";

// ---------------------------------------------------------------------------
// Payload field names
// ---------------------------------------------------------------------------

const FIELD_STATUS: &str = "status";
const FIELD_FINAL_REPORT: &str = "final_report";
const FIELD_FINAL_ASSESSMENT: &str = "final_assessment";
const FIELD_GREENWASH_SCORE: &str = "greenwash_score";
const FIELD_SUMMARY: &str = "summary";
const FIELD_THEMES: &str = "themes";
const FIELD_EVIDENCE: &str = "evidence";
const FIELD_ERROR: &str = "error";
const FIELD_CLAIMS: &str = "claims";
const FIELD_SEARCH_QUERIES: &str = "search_queries";
const FIELD_RETRIEVED_DOCS: &str = "retrieved_docs";

/// Build a snapshot from a raw status payload.
///
/// - A missing or unrecognized `status` is treated as `running` so that an
///   in-progress job is never mistaken for a finished one.
/// - `error` is only kept when the status is `failed`; a failed payload
///   without a reason gets [`UNKNOWN_FAILURE_REASON`].
pub fn normalize(raw: &RawStatusPayload) -> AnalysisSnapshot {
    let empty = Map::new();
    let fields = raw.as_object().unwrap_or(&empty);

    let status = fields
        .get(FIELD_STATUS)
        .and_then(Value::as_str)
        .and_then(AnalysisStatus::from_raw)
        .unwrap_or(AnalysisStatus::Running);

    let assessment = fields.get(FIELD_FINAL_ASSESSMENT).and_then(Value::as_object);
    let score = assessment
        .and_then(|a| a.get(FIELD_GREENWASH_SCORE))
        .and_then(number_value);
    let summary = assessment
        .and_then(|a| a.get(FIELD_SUMMARY))
        .and_then(text_value);

    let error = match status {
        AnalysisStatus::Failed => Some(
            fields
                .get(FIELD_ERROR)
                .and_then(text_value)
                .unwrap_or_else(|| UNKNOWN_FAILURE_REASON.to_string()),
        ),
        AnalysisStatus::Running | AnalysisStatus::Completed => None,
    };

    let evidence = objects(fields, FIELD_EVIDENCE).filter_map(evidence_item);

    AnalysisSnapshot {
        status,
        claims: objects(fields, FIELD_FINAL_REPORT).map(claim_verdict).collect(),
        evidence_by_claim: group_by_claim(evidence),
        score,
        summary,
        themes: strings(fields, FIELD_THEMES).collect::<IndexSet<_>>(),
        error,
        extracted_claims: objects(fields, FIELD_CLAIMS)
            .filter_map(extracted_claim)
            .collect(),
        search_queries: strings(fields, FIELD_SEARCH_QUERIES).collect(),
        retrieved_docs: objects(fields, FIELD_RETRIEVED_DOCS)
            .filter_map(retrieved_doc)
            .collect(),
    }
}

// ---- element mappers ----

fn claim_verdict(obj: &Map<String, Value>) -> ClaimVerdict {
    ClaimVerdict {
        claim: string_or_empty(obj, "claim"),
        synthesis: string_or_empty(obj, "synthesis"),
        status: obj
            .get("status")
            .and_then(Value::as_str)
            .map(ClaimStatus::from_raw)
            .unwrap_or(ClaimStatus::Error),
    }
}

/// Evidence that cannot be attributed to a claim is dropped.
fn evidence_item(obj: &Map<String, Value>) -> Option<EvidenceItem> {
    let Some(claim_text) = obj.get("claim_text").and_then(Value::as_str) else {
        tracing::debug!("Dropping evidence item without claim_text");
        return None;
    };
    Some(EvidenceItem {
        claim_text: claim_text.to_string(),
        snippet: obj.get("snippet").and_then(text_value),
        source: obj.get("source").and_then(text_value),
        weight: obj.get("weight").and_then(number_value).unwrap_or(0.0),
        note: obj.get("note").and_then(text_value),
    })
}

fn extracted_claim(obj: &Map<String, Value>) -> Option<ExtractedClaim> {
    Some(ExtractedClaim {
        text: obj.get("text").and_then(text_value)?,
        reference: obj.get("reference").and_then(text_value),
    })
}

fn retrieved_doc(obj: &Map<String, Value>) -> Option<RetrievedDoc> {
    let page_content = obj.get("page_content").and_then(Value::as_str)?;
    let metadata = obj.get("metadata").and_then(Value::as_object);
    Some(RetrievedDoc {
        page_content: page_content.to_string(),
        source: metadata.and_then(|m| m.get("source")).and_then(text_value),
        page: metadata.and_then(|m| m.get("page")).and_then(label_value),
    })
}

// ---- value helpers ----

/// Object elements of the array at `key`; anything else is skipped.
fn objects<'a>(
    fields: &'a Map<String, Value>,
    key: &str,
) -> impl Iterator<Item = &'a Map<String, Value>> + 'a {
    fields
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

/// Non-blank string elements of the array at `key`.
fn strings<'a>(fields: &'a Map<String, Value>, key: &str) -> impl Iterator<Item = String> + 'a {
    fields
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(text_value)
}

fn string_or_empty(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// A string with visible content. Blank strings count as absent.
fn text_value(value: &Value) -> Option<String> {
    value
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// A finite number, accepting numeric strings.
fn number_value(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// A label that may arrive as a string or a number.
fn label_value(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        other => text_value(other),
    }
}
