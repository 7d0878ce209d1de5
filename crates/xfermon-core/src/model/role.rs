// ── Task role relative to the monitored endpoint ──

use serde::{Deserialize, Serialize};

use super::endpoint::EndpointId;
use super::task::Task;

/// How a task touches the monitored endpoint.
///
/// The string forms (`SRC`, `DEST`, `DEST_SRC`) are the labels used in
/// console lines and notification digests.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::IntoStaticStr,
)]
pub enum Role {
    #[strum(serialize = "SRC")]
    #[serde(rename = "SRC")]
    Source,
    #[strum(serialize = "DEST")]
    #[serde(rename = "DEST")]
    Destination,
    #[strum(serialize = "DEST_SRC")]
    #[serde(rename = "DEST_SRC")]
    SourceAndDestination,
}

impl Role {
    /// Classify `task` against `endpoint`.
    ///
    /// Returns `None` only when the task touches neither side, which a
    /// listing filtered by endpoint should never produce.
    pub fn classify(task: &Task, endpoint: &EndpointId) -> Option<Self> {
        let is_source = task.source_endpoint_id == *endpoint;
        let is_destination = task.destination_endpoint_id == *endpoint;
        match (is_source, is_destination) {
            (true, true) => Some(Self::SourceAndDestination),
            (true, false) => Some(Self::Source),
            (false, true) => Some(Self::Destination),
            (false, false) => None,
        }
    }

    pub fn label(self) -> &'static str {
        self.into()
    }

    /// Contributes to the SOURCE bucket of the cycle totals.
    pub fn counts_as_source(self) -> bool {
        matches!(self, Self::Source | Self::SourceAndDestination)
    }

    /// Contributes to the DESTINATION bucket of the cycle totals.
    pub fn counts_as_destination(self) -> bool {
        matches!(self, Self::Destination | Self::SourceAndDestination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskStatus;

    fn task(src: &str, dst: &str) -> Task {
        Task {
            task_id: "t".into(),
            owner: "o".into(),
            source_endpoint_id: src.into(),
            destination_endpoint_id: dst.into(),
            status: TaskStatus::Active,
            files: 1,
            files_transferred: 0,
            bytes_transferred: 0,
            effective_bytes_per_second: 0,
            is_paused: false,
        }
    }

    #[test]
    fn classify_covers_every_combination_exactly_once() {
        let ep = EndpointId::from("E");
        let cases = [
            ("E", "X", Some(Role::Source)),
            ("X", "E", Some(Role::Destination)),
            ("E", "E", Some(Role::SourceAndDestination)),
            ("X", "Y", None),
        ];
        for (src, dst, expected) in cases {
            assert_eq!(Role::classify(&task(src, dst), &ep), expected, "{src}->{dst}");
        }
    }

    #[test]
    fn bucket_membership_follows_role() {
        assert!(Role::Source.counts_as_source());
        assert!(!Role::Source.counts_as_destination());
        assert!(Role::Destination.counts_as_destination());
        assert!(!Role::Destination.counts_as_source());
        assert!(Role::SourceAndDestination.counts_as_source());
        assert!(Role::SourceAndDestination.counts_as_destination());
    }

    #[test]
    fn labels_match_report_columns() {
        assert_eq!(Role::Source.label(), "SRC");
        assert_eq!(Role::Destination.to_string(), "DEST");
        assert_eq!(Role::SourceAndDestination.label(), "DEST_SRC");
    }
}
