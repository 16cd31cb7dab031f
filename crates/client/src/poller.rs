//! Analysis job poller.
//!
//! [`JobPoller`] submits a company for analysis and then polls the job's
//! status on a fixed interval until the backend reports a terminal status,
//! a request fails, or the poll cycle is cancelled. Every fetched payload
//! is normalized into an [`AnalysisSnapshot`] and delivered to the
//! poller's [`AnalysisObserver`].
//!
//! ```text
//! Idle ──start──▶ Submitting ──ok──▶ Polling ──completed──▶ Completed
//!                     │                 │ └─────failed────▶ Failed
//!                     └──────error──────┴──────error──────▶ Errored
//! Submitting | Polling ──cancel──▶ Cancelled
//! ```
//!
//! Each cycle runs on its own tokio task and is identified by a generation
//! number. Results are committed under the state lock only if the cycle is
//! still current and its [`CancellationToken`] has not fired, so a request
//! that completes after [`JobPoller::cancel`] is discarded silently.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use greenwatch_core::analysis::{AnalysisSnapshot, AnalysisStatus};
use greenwatch_core::error::CoreError;
use greenwatch_core::job::{validate_company_name, AnalysisJob};
use greenwatch_core::normalize::normalize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::{ClientConfig, DEFAULT_POLL_INTERVAL_MS};
use crate::events::AnalysisObserver;
use crate::transport::{AnalysisTransport, TransportError};

// ---------------------------------------------------------------------------
// States and errors
// ---------------------------------------------------------------------------

/// Lifecycle state of a [`JobPoller`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollerState {
    /// No cycle has been started.
    Idle,
    /// The submit request is in flight.
    Submitting,
    /// The job exists and its status is being polled.
    Polling,
    /// The backend reported `completed`.
    Completed,
    /// The backend reported `failed`.
    Failed,
    /// The client could not obtain a status (transport or decode failure).
    Errored,
    /// The cycle was cancelled by the caller.
    Cancelled,
}

impl PollerState {
    /// Whether a poll cycle is currently in progress.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Submitting | Self::Polling)
    }
}

impl fmt::Display for PollerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Submitting => "submitting",
            Self::Polling => "polling",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Errored => "errored",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Errors from misusing the poller API.
#[derive(Debug, thiserror::Error)]
pub enum PollerError {
    /// A poll cycle is already active.
    #[error("Cannot start analysis while poller is {state}")]
    InvalidState { state: PollerState },

    /// The submission input was rejected before any request was made.
    #[error(transparent)]
    InvalidInput(#[from] CoreError),
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tunable parameters for a [`JobPoller`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    /// Delay between the end of one status fetch and the start of the next.
    pub interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl From<&ClientConfig> for PollerConfig {
    fn from(config: &ClientConfig) -> Self {
        Self {
            interval: config.poll_interval,
        }
    }
}

// ---------------------------------------------------------------------------
// Poller
// ---------------------------------------------------------------------------

/// Drives one analysis job at a time from submission to a terminal state.
///
/// Must be used from within a tokio runtime; [`start`](Self::start) spawns
/// the poll cycle as a task. Dropping the poller cancels any active cycle.
pub struct JobPoller {
    shared: Arc<Shared>,
}

struct Shared {
    transport: Arc<dyn AnalysisTransport>,
    observer: Arc<dyn AnalysisObserver>,
    config: PollerConfig,
    inner: Mutex<PollerInner>,
}

struct PollerInner {
    state: PollerState,
    /// Incremented on every `start`; identifies the current cycle.
    generation: u64,
    cancel: CancellationToken,
    job: Option<AnalysisJob>,
    latest: Option<Arc<AnalysisSnapshot>>,
    task: Option<JoinHandle<()>>,
}

impl JobPoller {
    /// Create an idle poller.
    ///
    /// The observer is called while the poller holds its state lock; see
    /// [`AnalysisObserver`] for what callbacks may not do.
    pub fn new(
        transport: Arc<dyn AnalysisTransport>,
        observer: Arc<dyn AnalysisObserver>,
        config: PollerConfig,
    ) -> Self {
        let inner = PollerInner {
            state: PollerState::Idle,
            generation: 0,
            cancel: CancellationToken::new(),
            job: None,
            latest: None,
            task: None,
        };
        Self {
            shared: Arc::new(Shared {
                transport,
                observer,
                config,
                inner: Mutex::new(inner),
            }),
        }
    }

    /// Submit `company_name` for analysis and begin polling.
    ///
    /// Returns once the cycle has been spawned; progress is reported to the
    /// observer. Fails with [`PollerError::InvalidState`] while another
    /// cycle is active (that cycle is unaffected) and with
    /// [`PollerError::InvalidInput`] for a blank company name.
    pub fn start(&self, company_name: &str) -> Result<(), PollerError> {
        let company_name = validate_company_name(company_name)?.to_string();

        let mut inner = self.shared.lock();
        if inner.state.is_active() {
            return Err(PollerError::InvalidState { state: inner.state });
        }

        inner.generation += 1;
        inner.cancel = CancellationToken::new();
        inner.state = PollerState::Submitting;
        inner.job = None;
        inner.latest = None;

        let generation = inner.generation;
        tracing::info!(cycle = generation, company = %company_name, "Starting analysis");

        let shared = Arc::clone(&self.shared);
        let cancel = inner.cancel.clone();
        inner.task = Some(tokio::spawn(run_cycle(
            shared,
            generation,
            cancel,
            company_name,
        )));
        Ok(())
    }

    /// Cancel the active cycle, if any.
    ///
    /// A pending interval sleep is abandoned immediately. A request already
    /// in flight is allowed to finish but its result is discarded. No
    /// observer callback runs after this returns. Returns `false` when no
    /// cycle was active.
    pub fn cancel(&self) -> bool {
        let mut inner = self.shared.lock();
        if !inner.state.is_active() {
            return false;
        }
        inner.cancel.cancel();
        inner.state = PollerState::Cancelled;
        tracing::info!(cycle = inner.generation, "Analysis polling cancelled");
        true
    }

    pub fn state(&self) -> PollerState {
        self.shared.lock().state
    }

    /// The job of the current cycle, once submission has succeeded.
    pub fn job(&self) -> Option<AnalysisJob> {
        self.shared.lock().job.clone()
    }

    /// The most recent snapshot delivered in the current cycle.
    pub fn latest_snapshot(&self) -> Option<Arc<AnalysisSnapshot>> {
        self.shared.lock().latest.clone()
    }

    /// Wait for the current cycle's task to finish and return the final
    /// state.
    ///
    /// Only one caller waits on a given cycle. If no cycle task is
    /// outstanding, including when another caller is already waiting, this
    /// returns the current state immediately and that state may still be
    /// active.
    pub async fn wait(&self) -> PollerState {
        let task = self.shared.lock().task.take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Poll cycle task failed");
            }
        }
        self.state()
    }
}

impl Drop for JobPoller {
    fn drop(&mut self) {
        self.shared.lock().cancel.cancel();
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, PollerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PollerInner {
    fn is_current(&self, generation: u64, cancel: &CancellationToken) -> bool {
        self.generation == generation && !cancel.is_cancelled()
    }
}

// ---------------------------------------------------------------------------
// Poll cycle
// ---------------------------------------------------------------------------

/// Moves a cycle that is still active when its task ends (observer panic,
/// runtime shutdown) to `Errored`, so the poller can be started again.
struct CycleGuard<'a> {
    shared: &'a Shared,
    generation: u64,
    cancel: &'a CancellationToken,
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        let mut inner = self.shared.lock();
        if inner.is_current(self.generation, self.cancel) && inner.state.is_active() {
            tracing::error!(cycle = self.generation, state = %inner.state, "Poll cycle ended abnormally");
            inner.state = PollerState::Errored;
        }
    }
}

/// Submit, then fetch/normalize/notify until a terminal state.
async fn run_cycle(
    shared: Arc<Shared>,
    generation: u64,
    cancel: CancellationToken,
    company_name: String,
) {
    let _guard = CycleGuard {
        shared: &shared,
        generation,
        cancel: &cancel,
    };

    let submitted = shared.transport.submit(&company_name).await;

    let job = {
        let mut inner = shared.lock();
        if !inner.is_current(generation, &cancel) {
            tracing::debug!(cycle = generation, "Discarding submit result of cancelled cycle");
            return;
        }
        match submitted {
            Ok(job) => {
                tracing::info!(cycle = generation, job_id = %job.id(), "Analysis submitted");
                inner.state = PollerState::Polling;
                inner.job = Some(job.clone());
                job
            }
            Err(e) => {
                inner.state = PollerState::Errored;
                report_error(&shared, generation, "submit", &e);
                return;
            }
        }
    };

    let mut tick: u64 = 0;
    loop {
        tick += 1;
        let fetched = shared.transport.fetch_status(&job).await;

        {
            let mut inner = shared.lock();
            if !inner.is_current(generation, &cancel) {
                tracing::debug!(
                    cycle = generation,
                    tick,
                    "Discarding status result of cancelled cycle",
                );
                return;
            }

            let raw = match fetched {
                Ok(raw) => raw,
                Err(e) => {
                    inner.state = PollerState::Errored;
                    report_error(&shared, generation, "fetch_status", &e);
                    return;
                }
            };

            let snapshot = Arc::new(normalize(&raw));
            let status = snapshot.status();
            inner.state = match status {
                AnalysisStatus::Running => PollerState::Polling,
                AnalysisStatus::Completed => PollerState::Completed,
                AnalysisStatus::Failed => PollerState::Failed,
            };
            inner.latest = Some(Arc::clone(&snapshot));

            tracing::debug!(
                cycle = generation,
                job_id = %job.id(),
                tick,
                status = status.as_str(),
                claims = snapshot.claims().len(),
                "Analysis status received",
            );
            shared.observer.on_update(&snapshot);

            if status.is_terminal() {
                tracing::info!(
                    cycle = generation,
                    job_id = %job.id(),
                    status = status.as_str(),
                    "Analysis finished",
                );
                return;
            }
        }

        // Wait before the next fetch, respecting cancellation.
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(shared.config.interval) => {}
        }
    }
}

/// Deliver a transport failure. Caller holds the state lock.
fn report_error(shared: &Shared, generation: u64, operation: &str, err: &TransportError) {
    tracing::warn!(cycle = generation, operation, error = %err, "Analysis request failed");
    shared.observer.on_error(&err.to_string());
}
