//! REST client for the sustainability-report HTTP endpoints.
//!
//! Wraps job submission (`POST /sustainability-report`) and status
//! retrieval (`GET /sustainability-report/{task_id}`) using [`reqwest`].

use async_trait::async_trait;
use greenwatch_core::job::AnalysisJob;
use greenwatch_core::normalize::RawStatusPayload;
use serde::Deserialize;

use crate::transport::{AnalysisTransport, TransportError};

/// Path of the report resource, relative to the service base URL.
pub const REPORT_PATH: &str = "/sustainability-report";

/// HTTP client for one analysis service.
#[derive(Debug, Clone)]
pub struct AnalysisApi {
    client: reqwest::Client,
    api_url: String,
}

/// Response returned by the submit endpoint.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    /// Server-assigned identifier for the analysis job.
    pub task_id: String,
}

impl AnalysisApi {
    /// Create an API client for an analysis service.
    ///
    /// * `api_url` - Base HTTP URL, e.g. `http://localhost:8000`.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    /// Create an API client reusing an existing [`reqwest::Client`]
    /// (e.g. one built with a request timeout).
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self { client, api_url }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Submit a company for analysis.
    ///
    /// Sends `POST /sustainability-report` with `{"company_name": ...}` and
    /// returns the job identified by the server's `task_id`.
    pub async fn submit_analysis(&self, company_name: &str) -> Result<AnalysisJob, TransportError> {
        let body = serde_json::json!({ "company_name": company_name });

        let response = self
            .client
            .post(format!("{}{REPORT_PATH}", self.api_url))
            .json(&body)
            .send()
            .await
            .map_err(network_error)?;

        let submitted: SubmitResponse = Self::parse_response(response).await?;
        if submitted.task_id.trim().is_empty() {
            return Err(TransportError::Decode(
                "submit response carried an empty task_id".to_string(),
            ));
        }

        tracing::debug!(task_id = %submitted.task_id, "Analysis job created");
        Ok(AnalysisJob::new(submitted.task_id))
    }

    /// Retrieve the raw status payload of a job.
    ///
    /// Sends `GET /sustainability-report/{task_id}`. The body is returned
    /// untyped; interpretation is left to the normalizer.
    pub async fn get_status(&self, job: &AnalysisJob) -> Result<RawStatusPayload, TransportError> {
        let response = self
            .client
            .get(format!("{}{REPORT_PATH}/{}", self.api_url, job.id()))
            .send()
            .await
            .map_err(network_error)?;

        Self::parse_response(response).await
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`TransportError::Http`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, TransportError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(TransportError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    ///
    /// A body that cannot be read to the end is a network failure; only a
    /// complete body that is not the expected JSON is a decode failure.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, TransportError> {
        let response = Self::ensure_success(response).await?;
        let body = response.bytes().await.map_err(network_error)?;
        serde_json::from_slice(&body).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

fn network_error(err: reqwest::Error) -> TransportError {
    TransportError::Network(err.to_string())
}

#[async_trait]
impl AnalysisTransport for AnalysisApi {
    async fn submit(&self, company_name: &str) -> Result<AnalysisJob, TransportError> {
        self.submit_analysis(company_name).await
    }

    async fn fetch_status(&self, job: &AnalysisJob) -> Result<RawStatusPayload, TransportError> {
        self.get_status(job).await
    }
}
