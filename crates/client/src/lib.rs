//! Client for the sustainability-report analysis service.
//!
//! Provides the HTTP transport for job submission and status retrieval,
//! the [`JobPoller`](poller::JobPoller) state machine that drives a job to
//! completion, observer types for delivering snapshots, and environment
//! configuration.

pub mod api;
pub mod config;
pub mod events;
pub mod poller;
pub mod transport;
