// ── API-to-domain conversions ──
//
// Maps raw task records from `xfermon-api` into canonical `Task` values.
// Decoding happens per record so one bad record never poisons a page.

use xfermon_api::TaskDocument;

use crate::error::CoreError;
use crate::model::{Task, TaskStatus};

impl From<TaskDocument> for Task {
    fn from(d: TaskDocument) -> Self {
        Self {
            task_id: d.task_id.into(),
            owner: d.owner_string,
            source_endpoint_id: d.source_endpoint_id.into(),
            destination_endpoint_id: d.destination_endpoint_id.into(),
            status: TaskStatus::from(d.status.as_str()),
            files: d.files,
            files_transferred: d.files_transferred,
            bytes_transferred: d.bytes_transferred,
            effective_bytes_per_second: d.effective_bytes_per_second,
            is_paused: d.is_paused,
        }
    }
}

/// Decode one raw listing record into a [`Task`].
///
/// Failures carry the record's `task_id` when it has one, so the skip can
/// be logged against the right task.
pub fn task_from_record(record: serde_json::Value) -> Result<Task, CoreError> {
    let task_id = record
        .get("task_id")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("<unknown>")
        .to_owned();
    TaskDocument::from_value(record)
        .map(Task::from)
        .map_err(|e| CoreError::MalformedTask {
            task_id,
            reason: e.to_string(),
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_complete_record() {
        let task = task_from_record(json!({
            "task_id": "t-1",
            "owner_string": "bob",
            "source_endpoint_id": "A",
            "destination_endpoint_id": "B",
            "status": "ACTIVE",
            "files": 42,
            "files_transferred": 2,
            "bytes_transferred": 2048,
            "effective_bytes_per_second": 10,
            "is_paused": true
        }))
        .unwrap();

        assert_eq!(task.task_id.as_str(), "t-1");
        assert_eq!(task.owner, "bob");
        assert_eq!(task.status, TaskStatus::Active);
        assert_eq!(task.files, 42);
        assert!(task.is_paused);
    }

    #[test]
    fn missing_field_is_malformed_with_task_id() {
        let err = task_from_record(json!({
            "task_id": "t-2",
            "owner_string": "bob",
            "status": "ACTIVE",
            "files": 1
        }))
        .unwrap_err();

        match err {
            CoreError::MalformedTask { task_id, reason } => {
                assert_eq!(task_id, "t-2");
                assert!(reason.contains("source_endpoint_id"), "{reason}");
            }
            other => panic!("expected MalformedTask, got {other:?}"),
        }
    }

    #[test]
    fn record_without_id_is_unknown() {
        let err = task_from_record(json!({ "files": "many" })).unwrap_err();
        assert!(matches!(err, CoreError::MalformedTask { ref task_id, .. } if task_id == "<unknown>"));
    }

    #[test]
    fn unrecognised_status_maps_to_unknown() {
        assert_eq!(TaskStatus::from("paused?"), TaskStatus::Unknown);
        assert_eq!(TaskStatus::from("succeeded"), TaskStatus::Succeeded);
    }
}
