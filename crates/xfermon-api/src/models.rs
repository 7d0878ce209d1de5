// Wire types for the endpoint-manager API.
//
// Listing responses keep their records as raw JSON so the caller can
// decode each one independently; `TaskDocument` is the typed shape of a
// single task record.

use serde::{Deserialize, Serialize};

/// One page of `GET endpoint_manager/task_list`.
///
/// Marker-paginated: when `has_next_page` is true, pass `last_key` back
/// as the `last_key` query parameter to fetch the following page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskListPage {
    #[serde(rename = "DATA", default)]
    pub data: Vec<serde_json::Value>,
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default)]
    pub last_key: Option<String>,
}

/// A single task record as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDocument {
    pub task_id: String,
    pub owner_string: String,
    pub source_endpoint_id: String,
    pub destination_endpoint_id: String,
    pub status: String,
    pub files: u64,
    #[serde(default)]
    pub files_transferred: u64,
    #[serde(default)]
    pub bytes_transferred: u64,
    #[serde(default)]
    pub effective_bytes_per_second: u64,
    #[serde(default)]
    pub is_paused: bool,
}

impl TaskDocument {
    /// Decode one raw record from a [`TaskListPage`].
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

/// Request body for `POST endpoint_manager/admin_pause`.
#[derive(Debug, Serialize)]
pub(crate) struct AdminPauseRequest<'a> {
    #[serde(rename = "DATA_TYPE")]
    pub data_type: &'static str,
    pub message: &'a str,
    pub task_id_list: &'a [String],
}

/// Response of `POST endpoint_manager/admin_pause`.
#[derive(Debug, Clone, Deserialize)]
pub struct PauseResult {
    /// Usually `"PauseAccepted"`.
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
}

/// Endpoint details from `GET endpoint/{id}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EndpointInfo {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub canonical_name: Option<String>,
    #[serde(default)]
    pub owner_string: Option<String>,
}

impl EndpointInfo {
    /// Best human-facing name: display name, then canonical name, then id.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.canonical_name.as_deref())
            .unwrap_or(&self.id)
    }
}
