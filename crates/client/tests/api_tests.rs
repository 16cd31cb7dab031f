//! Integration tests for the HTTP transport against an in-process fake
//! analysis service.

mod common;

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use axum::http::StatusCode;
use common::{spawn_raw_response, spawn_service, unreachable_url, FakeService};
use greenwatch_client::api::AnalysisApi;
use greenwatch_client::events::{AnalysisEvent, ChannelObserver};
use greenwatch_client::poller::{JobPoller, PollerConfig, PollerState};
use greenwatch_client::transport::{AnalysisTransport, TransportError, TransportErrorKind};
use greenwatch_core::analysis::AnalysisStatus;
use greenwatch_core::job::AnalysisJob;
use serde_json::json;

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submit_posts_company_name_and_returns_job() {
    let service = Arc::new(FakeService::default());
    let api = AnalysisApi::new(spawn_service(Arc::clone(&service)).await);

    let job = api.submit("Acme Co").await.unwrap();

    assert_eq!(job, AnalysisJob::new("t1"));
    let submitted = service.submitted.lock().unwrap().clone();
    assert_eq!(submitted, vec![json!({"company_name": "Acme Co"})]);
}

#[tokio::test]
async fn submit_non_2xx_is_http_error() {
    let service = Arc::new(FakeService::default());
    *service.submit_response.lock().unwrap() = Some((
        StatusCode::UNPROCESSABLE_ENTITY,
        json!({"detail": "company_name missing"}),
    ));
    let api = AnalysisApi::new(spawn_service(service).await);

    let err = api.submit("Acme Co").await.unwrap_err();

    assert_eq!(err.kind(), TransportErrorKind::Http);
    assert_eq!(err.status(), Some(422));
    assert_matches!(err, TransportError::Http { body, .. } if body.contains("company_name missing"));
}

#[tokio::test]
async fn submit_without_task_id_is_decode_error() {
    let service = Arc::new(FakeService::default());
    *service.submit_response.lock().unwrap() = Some((StatusCode::OK, json!({"id": "t1"})));
    let api = AnalysisApi::new(spawn_service(service).await);

    assert_matches!(api.submit("Acme Co").await, Err(TransportError::Decode(_)));
}

#[tokio::test]
async fn submit_with_empty_task_id_is_decode_error() {
    let service = Arc::new(FakeService::default());
    *service.submit_response.lock().unwrap() = Some((StatusCode::OK, json!({"task_id": ""})));
    let api = AnalysisApi::new(spawn_service(service).await);

    assert_matches!(api.submit("Acme Co").await, Err(TransportError::Decode(_)));
}

#[tokio::test]
async fn unreachable_service_is_network_error() {
    let api = AnalysisApi::new(unreachable_url().await);

    let err = api.submit("Acme Co").await.unwrap_err();
    assert_eq!(err.kind(), TransportErrorKind::Network);
    assert_eq!(err.status(), None);
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_status_returns_raw_payload() {
    let payload = json!({
        "status": "completed",
        "final_assessment": {"greenwash_score": 4, "summary": "Mixed."}
    });
    let service = FakeService::with_statuses(vec![(StatusCode::OK, payload.clone())]);
    let api = AnalysisApi::new(spawn_service(Arc::clone(&service)).await);

    let raw = api.fetch_status(&AnalysisJob::new("abc-123")).await.unwrap();

    assert_eq!(raw, payload);
    assert_eq!(*service.polled.lock().unwrap(), vec!["abc-123".to_string()]);
}

#[tokio::test]
async fn fetch_status_non_2xx_is_http_error() {
    let service = FakeService::with_statuses(vec![(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"detail": "boom"}),
    )]);
    let api = AnalysisApi::new(spawn_service(service).await);

    let err = api.fetch_status(&AnalysisJob::new("t1")).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn fetch_status_non_json_body_is_decode_error() {
    let url = spawn_raw_response(
        "HTTP/1.1 200 OK\r\ncontent-type: text/html\r\ncontent-length: 9\r\nconnection: close\r\n\r\nnot json!",
    )
    .await;
    let api = AnalysisApi::new(url);

    let err = api.fetch_status(&AnalysisJob::new("t1")).await.unwrap_err();
    assert_eq!(err.kind(), TransportErrorKind::Decode);
}

/// A connection dropped halfway through the body is a network failure.
#[tokio::test]
async fn fetch_status_truncated_body_is_network_error() {
    let url = spawn_raw_response(
        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 64\r\n\r\n{\"status\": \"run",
    )
    .await;
    let api = AnalysisApi::new(url);

    let err = api.fetch_status(&AnalysisJob::new("t1")).await.unwrap_err();
    assert_eq!(err.kind(), TransportErrorKind::Network);
}

// ---------------------------------------------------------------------------
// End to end
// ---------------------------------------------------------------------------

#[tokio::test]
async fn poller_runs_job_to_completion_over_http() {
    let service = FakeService::with_statuses(vec![
        (StatusCode::OK, json!({"status": "running"})),
        (StatusCode::OK, json!({"status": "running", "themes": ["Climate"]})),
        (
            StatusCode::OK,
            json!({
                "status": "completed",
                "final_report": [{"claim": "Net zero by 2030", "synthesis": "...", "status": "Verified"}],
                "final_assessment": {"greenwash_score": 3, "summary": "Credible."}
            }),
        ),
    ]);
    let api = AnalysisApi::new(spawn_service(Arc::clone(&service)).await);
    let (observer, mut rx) = ChannelObserver::new();
    let poller = JobPoller::new(
        Arc::new(api),
        Arc::new(observer),
        PollerConfig {
            interval: Duration::from_millis(10),
        },
    );

    poller.start("Acme Co").unwrap();
    assert_eq!(poller.wait().await, PollerState::Completed);

    let mut statuses = Vec::new();
    while let Ok(event) = rx.try_recv() {
        match event {
            AnalysisEvent::Update(snapshot) => statuses.push(snapshot.status()),
            AnalysisEvent::Error(message) => panic!("unexpected error: {message}"),
        }
    }
    assert_eq!(
        statuses,
        vec![
            AnalysisStatus::Running,
            AnalysisStatus::Running,
            AnalysisStatus::Completed
        ]
    );
    assert_eq!(service.polled.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn poller_reports_unreachable_service_as_error() {
    let api = AnalysisApi::new(unreachable_url().await);
    let (observer, mut rx) = ChannelObserver::new();
    let poller = JobPoller::new(Arc::new(api), Arc::new(observer), PollerConfig::default());

    poller.start("Acme Co").unwrap();
    assert_eq!(poller.wait().await, PollerState::Errored);

    assert_matches!(rx.try_recv(), Ok(AnalysisEvent::Error(m)) if m.starts_with("Network error"));
    assert!(rx.try_recv().is_err());
}
