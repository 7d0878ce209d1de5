//! Monitoring and pause-policy engine between `xfermon-api` and the CLI.
//!
//! This crate owns the decision logic of the transfer monitor:
//!
//! - **[`Role`]**: Classifies each active task relative to the monitored
//!   endpoint (source, destination, or both).
//!
//! - **[`PolicyEngine`]**: Applies the threshold rules (self-loop pause,
//!   oversized-destination pause, display, notify) and builds the pause
//!   justification text.
//!
//! - **[`DedupLedger`]**: Per-endpoint, process-lifetime record of tasks
//!   already acted upon, so a pause is issued at most once per run.
//!
//! - **[`CycleTotals`]**: Per-cycle file, task and throughput totals split
//!   by role.
//!
//! - **[`NotificationBuffer`]**: Digest lines and operator alerts waiting
//!   for delivery through an injected [`NotificationSink`]; content that
//!   fails to deliver is retained for the next flush.
//!
//! - **[`EndpointMonitor`] / [`Scheduler`]**: One poll → classify →
//!   evaluate → aggregate → report cycle per endpoint, repeated on a fixed
//!   interval until cancelled.
//!
//! The remote service is reached through the [`TransferService`] trait,
//! implemented for [`xfermon_api::TransferClient`].

pub mod config;
pub mod convert;
pub mod error;
pub mod ledger;
pub mod model;
pub mod monitor;
pub mod notify;
pub mod policy;
pub mod scheduler;
pub mod service;
pub mod stats;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{MonitorConfig, MonitorOptions};
pub use error::CoreError;
pub use ledger::{DedupLedger, PauseFailure};
pub use model::{EndpointId, MonitoredEndpoint, PolicyThresholds, Role, Task, TaskId, TaskStatus};
pub use monitor::{CycleReport, EndpointMonitor, NotifyStatus, PauseAction, PauseOutcome, ReportLine};
pub use notify::{Alert, NotificationBuffer, NotificationSink, SinkError};
pub use policy::{Evaluation, PauseDecision, PauseRule, PolicyEngine, average_file_size_mib};
pub use scheduler::{CycleState, Scheduler, SchedulerEvent};
pub use service::TransferService;
pub use stats::{BucketTotals, CycleTotals};
pub use xfermon_api::TransferClient;
