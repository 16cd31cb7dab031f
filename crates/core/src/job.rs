//! Analysis job identity and submission input validation.

use serde::Serialize;

use crate::error::CoreError;

/// A backend-tracked analysis request, identified by an opaque id.
///
/// Created from the submit response and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AnalysisJob {
    id: String,
}

impl AnalysisJob {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Server-assigned task id.
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Validate and trim a company name before submission.
///
/// Returns the trimmed name, or a validation error if nothing but
/// whitespace remains.
pub fn validate_company_name(company_name: &str) -> Result<&str, CoreError> {
    let trimmed = company_name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "company_name must not be empty".to_string(),
        ));
    }
    Ok(trimmed)
}
