//! Delivery of poller notifications to consumers.
//!
//! A [`JobPoller`](crate::poller::JobPoller) reports every snapshot it
//! produces through [`AnalysisObserver::on_update`] and a transport failure
//! through [`AnalysisObserver::on_error`]. A backend-reported failure is a
//! well-formed outcome and arrives as an update with status `failed`.

use greenwatch_core::analysis::AnalysisSnapshot;
use tokio::sync::mpsc;

/// A notification emitted by the poller.
#[derive(Debug, Clone)]
pub enum AnalysisEvent {
    /// A snapshot produced by one poll tick.
    Update(AnalysisSnapshot),
    /// The service could not be reached or answered unusably. Terminal.
    Error(String),
}

/// Receiver of poller notifications.
///
/// Callbacks run on the poller's task while it holds its state lock, so
/// they must return quickly and must not call back into the same poller.
pub trait AnalysisObserver: Send + Sync {
    fn on_update(&self, snapshot: &AnalysisSnapshot);
    fn on_error(&self, message: &str);
}

/// Forwards notifications into an unbounded channel.
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<AnalysisEvent>,
}

impl ChannelObserver {
    /// Create an observer and the receiving end of its channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<AnalysisEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: AnalysisEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("Analysis event receiver dropped");
        }
    }
}

impl AnalysisObserver for ChannelObserver {
    fn on_update(&self, snapshot: &AnalysisSnapshot) {
        self.send(AnalysisEvent::Update(snapshot.clone()));
    }

    fn on_error(&self, message: &str) {
        self.send(AnalysisEvent::Error(message.to_string()));
    }
}

/// Adapts a pair of closures into an [`AnalysisObserver`].
pub struct CallbackObserver<U, E> {
    on_update: U,
    on_error: E,
}

impl<U, E> CallbackObserver<U, E>
where
    U: Fn(&AnalysisSnapshot) + Send + Sync,
    E: Fn(&str) + Send + Sync,
{
    pub fn new(on_update: U, on_error: E) -> Self {
        Self {
            on_update,
            on_error,
        }
    }
}

impl<U, E> AnalysisObserver for CallbackObserver<U, E>
where
    U: Fn(&AnalysisSnapshot) + Send + Sync,
    E: Fn(&str) + Send + Sync,
{
    fn on_update(&self, snapshot: &AnalysisSnapshot) {
        (self.on_update)(snapshot);
    }

    fn on_error(&self, message: &str) {
        (self.on_error)(message);
    }
}
