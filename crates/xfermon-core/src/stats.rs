// ── Per-cycle totals ──

use std::fmt;

use serde::Serialize;

use crate::model::{Role, Task};

const MIB: f64 = 1_048_576.0;

/// Totals for one side (source or destination) of the monitored endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BucketTotals {
    pub files: u64,
    pub tasks: u64,
    pub bytes_per_second: u64,
}

impl BucketTotals {
    fn add(&mut self, task: &Task) {
        self.files = self.files.saturating_add(task.files);
        self.tasks = self.tasks.saturating_add(1);
        self.bytes_per_second = self
            .bytes_per_second
            .saturating_add(task.effective_bytes_per_second);
    }

    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    pub fn mib_per_second(&self) -> f64 {
        self.bytes_per_second as f64 / MIB
    }
}

/// Source and destination totals for one endpoint and one cycle.
///
/// A self-looping task counts in both buckets. `Display` renders the
/// two-row summary table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CycleTotals {
    pub source: BucketTotals,
    pub destination: BucketTotals,
}

impl CycleTotals {
    pub fn record(&mut self, role: Role, task: &Task) {
        if role.counts_as_source() {
            self.source.add(task);
        }
        if role.counts_as_destination() {
            self.destination.add(task);
        }
    }
}

impl fmt::Display for CycleTotals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "...TOTAL.files..tasks..MBps...")?;
        for (label, bucket) in [("SRC", &self.source), ("DEST", &self.destination)] {
            writeln!(
                f,
                "{label:<4} {:>9}  {:>4}  {:>6.1}",
                bucket.files,
                bucket.tasks,
                bucket.mib_per_second()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::TaskStatus;

    fn task(id: &str, files: u64, bps: u64) -> Task {
        Task {
            task_id: id.into(),
            owner: "o".into(),
            source_endpoint_id: "A".into(),
            destination_endpoint_id: "B".into(),
            status: TaskStatus::Active,
            files,
            files_transferred: 0,
            bytes_transferred: 0,
            effective_bytes_per_second: bps,
            is_paused: false,
        }
    }

    #[test]
    fn totals_split_by_role() {
        let mut totals = CycleTotals::default();
        totals.record(Role::Source, &task("s", 10, 1_048_576));
        totals.record(Role::Destination, &task("d", 20, 1_048_576));

        assert_eq!(
            totals.source,
            BucketTotals {
                files: 10,
                tasks: 1,
                bytes_per_second: 1_048_576
            }
        );
        assert_eq!(totals.destination.files, 20);
        assert_eq!(totals.destination.tasks, 1);
        assert!((totals.destination.mib_per_second() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn self_loop_counts_on_both_sides() {
        let mut totals = CycleTotals::default();
        totals.record(Role::SourceAndDestination, &task("x", 7, 0));
        totals.record(Role::Source, &task("s", 3, 0));

        assert_eq!(totals.source.files, 10);
        assert_eq!(totals.source.tasks, 2);
        assert_eq!(totals.destination.files, 7);
        assert_eq!(totals.destination.tasks, 1);
    }

    #[test]
    fn summary_table_renders_both_rows() {
        let mut totals = CycleTotals::default();
        totals.record(Role::Source, &task("s", 10, 1_048_576));
        totals.record(Role::Destination, &task("d", 20, 1_572_864));

        assert_eq!(
            totals.to_string(),
            "...TOTAL.files..tasks..MBps...\n\
             SRC         10     1     1.0\n\
             DEST        20     1     1.5\n"
        );
    }
}
