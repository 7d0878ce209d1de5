// ── Domain model ──
//
// Canonical types for the monitor. Wire shapes live in `xfermon-api`;
// `crate::convert` maps them into these.

pub mod endpoint;
pub mod role;
pub mod task;
pub mod thresholds;

pub use endpoint::{EndpointId, MonitoredEndpoint};
pub use role::Role;
pub use task::{Task, TaskId, TaskStatus};
pub use thresholds::PolicyThresholds;
