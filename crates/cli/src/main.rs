//! `greenwatch` -- command-line client for the sustainability-report service.
//!
//! Submits a company for greenwashing analysis, logs pipeline progress
//! while the job runs, and prints the final report as JSON.
//!
//! ```text
//! greenwatch "Acme Co"
//! ```
//!
//! # Environment variables
//!
//! | Variable               | Required | Default                 | Description                   |
//! |------------------------|----------|-------------------------|-------------------------------|
//! | `GREENWATCH_API_URL`   | no       | `http://localhost:8000` | Analysis service base URL     |
//! | `POLL_INTERVAL_MS`     | no       | `5000`                  | Delay between status fetches  |
//! | `REQUEST_TIMEOUT_SECS` | no       | `30`                    | Per-request HTTP timeout      |
//! | `RUST_LOG`             | no       | `greenwatch=info,...`   | Log filter                    |

use std::sync::Arc;

use anyhow::{bail, Context};
use greenwatch_client::api::AnalysisApi;
use greenwatch_client::config::ClientConfig;
use greenwatch_client::events::{AnalysisEvent, ChannelObserver};
use greenwatch_client::poller::{JobPoller, PollerConfig};
use greenwatch_core::analysis::{AnalysisSnapshot, AnalysisStatus};
use greenwatch_core::progress::stage_progress;
use greenwatch_core::report::AnalysisReport;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "greenwatch=info,greenwatch_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let company_name = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if company_name.trim().is_empty() {
        bail!("usage: greenwatch <company name>");
    }

    let config = ClientConfig::from_env()?;
    tracing::info!(
        api_url = %config.api_url,
        poll_interval_ms = config.poll_interval.as_millis() as u64,
        "Starting greenwatch",
    );

    let http = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .context("Failed to build HTTP client")?;
    let api = AnalysisApi::with_client(http, config.api_url.clone());

    let (observer, mut events) = ChannelObserver::new();
    let poller = JobPoller::new(
        Arc::new(api),
        Arc::new(observer),
        PollerConfig::from(&config),
    );
    poller.start(&company_name)?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                poller.cancel();
                tracing::warn!("Interrupted, analysis polling cancelled");
                return Ok(());
            }
            event = events.recv() => match event {
                Some(AnalysisEvent::Update(snapshot)) => {
                    if snapshot.status().is_terminal() {
                        return finish(&snapshot);
                    }
                    log_progress(&snapshot);
                }
                Some(AnalysisEvent::Error(message)) => {
                    bail!("Could not reach analysis service: {message}");
                }
                None => {
                    let state = poller.wait().await;
                    bail!("Analysis ended without a result (poller {state})");
                }
            }
        }
    }
}

fn log_progress(snapshot: &AnalysisSnapshot) {
    for progress in stage_progress(snapshot) {
        tracing::info!(
            stage = progress.stage.title(),
            state = ?progress.state,
            items = progress.item_count,
            "Analysis in progress",
        );
    }
}

/// Print the report for a terminal snapshot.
fn finish(snapshot: &AnalysisSnapshot) -> anyhow::Result<()> {
    let report = AnalysisReport::from_snapshot(snapshot);
    println!("{}", serde_json::to_string_pretty(&report)?);

    if snapshot.status() == AnalysisStatus::Failed {
        bail!(
            "Analysis failed: {}",
            snapshot.error().unwrap_or("unknown reason")
        );
    }
    if let Some(concern) = report.concern {
        tracing::info!(score = report.score, concern = concern.label(), "Analysis complete");
    }
    Ok(())
}
