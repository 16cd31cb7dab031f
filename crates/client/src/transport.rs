//! Transport seam between the poller and the analysis service.

use async_trait::async_trait;
use greenwatch_core::job::AnalysisJob;
use greenwatch_core::normalize::RawStatusPayload;

/// Category of a [`TransportError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Network,
    Http,
    Decode,
}

/// Errors from a single submit or status request.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// No response was obtained (connection refused, DNS, TLS, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// The service answered with a non-2xx status code.
    #[error("Analysis service error ({status}): {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A 2xx response whose body was not the expected shape.
    #[error("Malformed response: {0}")]
    Decode(String),
}

impl TransportError {
    pub fn kind(&self) -> TransportErrorKind {
        match self {
            Self::Network(_) => TransportErrorKind::Network,
            Self::Http { .. } => TransportErrorKind::Http,
            Self::Decode(_) => TransportErrorKind::Decode,
        }
    }

    /// HTTP status code, for [`TransportError::Http`] only.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// The two operations the poller needs from the analysis service.
///
/// Each call performs exactly one request. Implementations must not retry
/// or cache.
#[async_trait]
pub trait AnalysisTransport: Send + Sync {
    /// Create an analysis job for `company_name`.
    async fn submit(&self, company_name: &str) -> Result<AnalysisJob, TransportError>;

    /// Read the current status payload of `job`.
    async fn fetch_status(&self, job: &AnalysisJob) -> Result<RawStatusPayload, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_http_error() {
        let err = TransportError::Http {
            status: 503,
            body: "overloaded".to_string(),
        };
        assert_eq!(err.to_string(), "Analysis service error (503): overloaded");
        assert_eq!(err.kind(), TransportErrorKind::Http);
        assert_eq!(err.status(), Some(503));
    }

    #[test]
    fn display_network_error() {
        let err = TransportError::Network("connection refused".to_string());
        assert_eq!(err.to_string(), "Network error: connection refused");
        assert_eq!(err.kind(), TransportErrorKind::Network);
        assert_eq!(err.status(), None);
    }

    #[test]
    fn display_decode_error() {
        let err = TransportError::Decode("missing task_id".to_string());
        assert_eq!(err.to_string(), "Malformed response: missing task_id");
        assert_eq!(err.kind(), TransportErrorKind::Decode);
    }
}
