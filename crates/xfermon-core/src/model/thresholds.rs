// ── Policy thresholds ──

use serde::{Deserialize, Serialize};

/// File-count thresholds, constant for a run. Every comparison is strict
/// (`files > threshold`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyThresholds {
    /// Print a console line for tasks above this.
    pub display_threshold: u64,
    /// Add a notification digest line for tasks above this.
    pub notify_threshold: u64,
    /// Pause destination-role tasks above this.
    pub pause_threshold: u64,
    /// Pause self-looping tasks above this.
    pub same_endpoint_pause_threshold: u64,
}

impl Default for PolicyThresholds {
    fn default() -> Self {
        Self {
            display_threshold: 100_000,
            notify_threshold: 100_000,
            pause_threshold: 100_000,
            same_endpoint_pause_threshold: 500,
        }
    }
}
