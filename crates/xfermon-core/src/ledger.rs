// ── Pause de-duplication ledger ──
//
// Process-lifetime memory of which tasks have had a pause action taken.
// Nothing is persisted: after a restart the monitor may pause (a no-op on
// the service) and alert again for the same task.

use std::collections::{HashMap, HashSet};

use crate::model::TaskId;

/// Failed pause attempts for a task that has not been marked yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PauseFailure {
    /// Consecutive failed attempts, starting at 1.
    pub attempts: u32,
    /// Whether this failure should produce an operator alert.
    pub alert_due: bool,
}

/// Tasks already acted upon during this run, owned by a single endpoint
/// monitor. Marks are never removed; failure counts last only while the
/// task keeps showing up in complete listings.
#[derive(Debug, Default)]
pub struct DedupLedger {
    marked: HashSet<TaskId>,
    failures: HashMap<TaskId, u32>,
}

impl DedupLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a pause action has been taken for `task_id`.
    ///
    /// Returns `false` if it was already marked. Clears any failure count.
    pub fn mark(&mut self, task_id: &TaskId) -> bool {
        self.failures.remove(task_id);
        self.marked.insert(task_id.clone())
    }

    pub fn is_marked(&self, task_id: &TaskId) -> bool {
        self.marked.contains(task_id)
    }

    /// Count a failed pause attempt for an unmarked task.
    ///
    /// An alert is due on the first failure and then on every
    /// `alert_every`-th retry; `alert_every == 0` alerts only once.
    pub fn record_failure(&mut self, task_id: &TaskId, alert_every: u32) -> PauseFailure {
        let attempts = self.failures.entry(task_id.clone()).or_insert(0);
        *attempts = attempts.saturating_add(1);
        let attempts = *attempts;
        let alert_due = attempts == 1 || (alert_every > 0 && (attempts - 1) % alert_every == 0);
        PauseFailure {
            attempts,
            alert_due,
        }
    }

    /// Failed attempts so far for an unmarked task.
    pub fn failed_attempts(&self, task_id: &TaskId) -> u32 {
        self.failures.get(task_id).copied().unwrap_or(0)
    }

    /// Forget failure counts for tasks not in `listed`.
    pub fn retain_failures(&mut self, listed: &HashSet<TaskId>) {
        self.failures.retain(|id, _| listed.contains(id));
    }

    /// Number of marked tasks.
    pub fn len(&self) -> usize {
        self.marked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marked.is_empty()
    }
}
