use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Canned responses and recorded requests of a fake analysis service.
#[derive(Default)]
pub struct FakeService {
    /// Response to `POST /sustainability-report`; defaults to `{"task_id": "t1"}`.
    pub submit_response: Mutex<Option<(StatusCode, Value)>>,
    /// Responses to successive status requests; `{"status": "running"}` once exhausted.
    pub status_responses: Mutex<VecDeque<(StatusCode, Value)>>,
    /// Request bodies received by the submit endpoint.
    pub submitted: Mutex<Vec<Value>>,
    /// Task ids requested from the status endpoint.
    pub polled: Mutex<Vec<String>>,
}

impl FakeService {
    pub fn with_statuses(statuses: Vec<(StatusCode, Value)>) -> Arc<Self> {
        Arc::new(Self {
            status_responses: Mutex::new(statuses.into()),
            ..Default::default()
        })
    }
}

async fn submit(
    State(service): State<Arc<FakeService>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    service.submitted.lock().unwrap().push(body);
    let (status, body) = service
        .submit_response
        .lock()
        .unwrap()
        .clone()
        .unwrap_or_else(|| (StatusCode::OK, json!({"task_id": "t1"})));
    (status, Json(body))
}

async fn status(
    State(service): State<Arc<FakeService>>,
    Path(task_id): Path<String>,
) -> (StatusCode, Json<Value>) {
    service.polled.lock().unwrap().push(task_id);
    let (status, body) = service
        .status_responses
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| (StatusCode::OK, json!({"status": "running"})));
    (status, Json(body))
}

/// Serve the fake on an ephemeral localhost port and return its base URL.
pub async fn spawn_service(service: Arc<FakeService>) -> String {
    let app = Router::new()
        .route("/sustainability-report", post(submit))
        .route("/sustainability-report/{task_id}", get(status))
        .with_state(service);

    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// A base URL on which nothing is listening.
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Answer a single connection with `response` written verbatim, then close it.
pub async fn spawn_raw_response(response: &'static str) -> String {
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                return;
            }
            request.extend_from_slice(&buf[..n]);
        }
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
    });
    format!("http://{addr}")
}
