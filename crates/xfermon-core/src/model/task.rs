// ── Task domain types ──

use std::fmt;

use serde::{Deserialize, Serialize};

use super::endpoint::EndpointId;

/// Opaque task identifier, stable across cycles while the task exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `pad` so width/alignment specifiers apply in report columns.
        f.pad(&self.0)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Task lifecycle state as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum TaskStatus {
    Active,
    Inactive,
    Succeeded,
    Failed,
    Unknown,
}

impl TaskStatus {
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl From<&str> for TaskStatus {
    fn from(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "ACTIVE" => Self::Active,
            "INACTIVE" => Self::Inactive,
            "SUCCEEDED" => Self::Succeeded,
            "FAILED" => Self::Failed,
            _ => Self::Unknown,
        }
    }
}

/// Snapshot of one transfer task, taken once per cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: TaskId,
    /// Submitting principal (e.g. `alice@example.org`).
    pub owner: String,
    pub source_endpoint_id: EndpointId,
    pub destination_endpoint_id: EndpointId,
    pub status: TaskStatus,
    /// Total files planned or in flight.
    pub files: u64,
    pub files_transferred: u64,
    pub bytes_transferred: u64,
    pub effective_bytes_per_second: u64,
    /// Already paused by the service, possibly out-of-band.
    pub is_paused: bool,
}
