// ── Pause policy ──
//
// Pure decision logic: given a classified task, the thresholds, and the
// ledger, decide whether to pause it (and why), display it, or notify
// about it. Side effects (the remote pause, alerts, marking the ledger)
// are carried out by `crate::monitor`.

use crate::ledger::DedupLedger;
use crate::model::{PolicyThresholds, Role, Task};

const MIB: u64 = 1_048_576;

/// Smallest average file size ever reported, so tiny files never read as
/// "0.00 MB". Presentation only.
const MIN_REPORTED_AVG_MIB: f64 = 0.01;

/// Which pause rule fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum PauseRule {
    /// Source and destination are both the monitored endpoint.
    SelfLoop,
    /// Destination-role task with too many files.
    OversizedDestination,
}

impl PauseRule {
    /// Subject prefix of the operator alert.
    pub fn alert_tag(self) -> &'static str {
        match self {
            Self::SelfLoop => "PAUSED_SRC=DEST",
            Self::OversizedDestination => "PAUSED_NFILES",
        }
    }
}

/// A pause the monitor should carry out.
#[derive(Debug, Clone, PartialEq)]
pub struct PauseDecision {
    pub rule: PauseRule,
    /// Message sent with the pause request and shown to the task owner.
    pub justification: String,
    /// The service already reports the task paused; skip the remote call.
    pub skip_remote_call: bool,
}

/// Outcome of evaluating one task.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// A pause rule fired for a task already in the ledger. No further
    /// rules are evaluated for it this cycle.
    AlreadyHandled { rule: PauseRule },
    Evaluated {
        pause: Option<PauseDecision>,
        display: bool,
        notify: bool,
    },
}

/// Threshold rules for one monitored endpoint.
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    thresholds: PolicyThresholds,
}

impl PolicyEngine {
    pub fn new(thresholds: PolicyThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &PolicyThresholds {
        &self.thresholds
    }

    /// Evaluate the rules for `task` in order: self-loop pause,
    /// oversized-destination pause, display, notify.
    pub fn evaluate(&self, task: &Task, role: Role, ledger: &DedupLedger) -> Evaluation {
        let t = &self.thresholds;

        let pause_rule = match role {
            Role::SourceAndDestination if task.files > t.same_endpoint_pause_threshold => {
                Some(PauseRule::SelfLoop)
            }
            Role::Destination if task.files > t.pause_threshold => {
                Some(PauseRule::OversizedDestination)
            }
            _ => None,
        };

        let pause = match pause_rule {
            Some(rule) if ledger.is_marked(&task.task_id) => {
                return Evaluation::AlreadyHandled { rule };
            }
            Some(rule) => Some(PauseDecision {
                rule,
                justification: self.justification(rule, task),
                skip_remote_call: task.is_paused,
            }),
            None => None,
        };

        let self_loop = role == Role::SourceAndDestination;
        Evaluation::Evaluated {
            pause,
            display: task.files > t.display_threshold || self_loop,
            notify: task.files > t.notify_threshold || self_loop,
        }
    }

    /// Pause justification text for `rule`.
    pub fn justification(&self, rule: PauseRule, task: &Task) -> String {
        match rule {
            PauseRule::SelfLoop => format!(
                "SRC and DEST endpoint are the same. The task has {} files, above the \
                 same-endpoint limit of {}. Copy data within an endpoint locally instead. \
                 Support has been notified.",
                task.files, self.thresholds.same_endpoint_pause_threshold
            ),
            PauseRule::OversizedDestination => format!(
                "File count {} exceeds endpoint transfer limit of {} (average file size \
                 {:.2} MB). Please bundle small files (e.g. with tar) and resubmit. \
                 Support has been notified.",
                task.files,
                self.thresholds.pause_threshold,
                average_file_size_mib(task.bytes_transferred, task.files_transferred)
            ),
        }
    }
}

/// Average transferred file size in MiB, clamped to at least 0.01.
///
/// `files_transferred == 0` is treated as 1 so this never divides by zero.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub fn average_file_size_mib(bytes_transferred: u64, files_transferred: u64) -> f64 {
    let per_file = bytes_transferred as f64 / files_transferred.max(1) as f64;
    (per_file / MIB as f64).max(MIN_REPORTED_AVG_MIB)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::TaskStatus;

    fn thresholds(display: u64, notify: u64, pause: u64, same: u64) -> PolicyThresholds {
        PolicyThresholds {
            display_threshold: display,
            notify_threshold: notify,
            pause_threshold: pause,
            same_endpoint_pause_threshold: same,
        }
    }

    fn task(files: u64) -> Task {
        Task {
            task_id: "t-1".into(),
            owner: "alice".into(),
            source_endpoint_id: "X".into(),
            destination_endpoint_id: "E".into(),
            status: TaskStatus::Active,
            files,
            files_transferred: 4,
            bytes_transferred: 4 * 3 * MIB,
            effective_bytes_per_second: 0,
            is_paused: false,
        }
    }

    #[test]
    fn destination_below_pause_is_displayed_not_notified() {
        let engine = PolicyEngine::new(thresholds(40, 1000, 1000, 500));
        let eval = engine.evaluate(&task(50), Role::Destination, &DedupLedger::new());
        assert_eq!(
            eval,
            Evaluation::Evaluated {
                pause: None,
                display: true,
                notify: false,
            }
        );
    }

    #[test]
    fn oversized_destination_pauses_with_average_size() {
        let engine = PolicyEngine::new(thresholds(100_000, 100_000, 1000, 500));
        let eval = engine.evaluate(&task(1200), Role::Destination, &DedupLedger::new());
        let Evaluation::Evaluated {
            pause: Some(decision),
            display,
            notify,
        } = eval
        else {
            panic!("expected a pause decision, got {eval:?}");
        };
        assert_eq!(decision.rule, PauseRule::OversizedDestination);
        assert!(!decision.skip_remote_call);
        assert!(decision.justification.contains("File count 1200"));
        assert!(decision.justification.contains("average file size 3.00 MB"));
        assert!(decision.justification.contains("bundle small files"));
        assert!(!display);
        assert!(!notify);
    }

    #[test]
    fn self_loop_always_displayed_and_notified() {
        let engine = PolicyEngine::new(thresholds(100_000, 100_000, 100_000, 500));
        let eval = engine.evaluate(&task(10), Role::SourceAndDestination, &DedupLedger::new());
        assert_eq!(
            eval,
            Evaluation::Evaluated {
                pause: None,
                display: true,
                notify: true,
            }
        );
    }

    #[test]
    fn self_loop_over_threshold_pauses_then_is_already_handled() {
        let engine = PolicyEngine::new(thresholds(100_000, 100_000, 100_000, 500));
        let mut ledger = DedupLedger::new();
        let t = task(2000);

        match engine.evaluate(&t, Role::SourceAndDestination, &ledger) {
            Evaluation::Evaluated {
                pause: Some(decision),
                ..
            } => {
                assert_eq!(decision.rule, PauseRule::SelfLoop);
                assert!(decision.justification.starts_with("SRC and DEST endpoint are the same"));
            }
            other => panic!("expected a pause decision, got {other:?}"),
        }

        ledger.mark(&t.task_id);
        assert_eq!(
            engine.evaluate(&t, Role::SourceAndDestination, &ledger),
            Evaluation::AlreadyHandled {
                rule: PauseRule::SelfLoop
            }
        );
    }

    #[test]
    fn source_role_is_never_paused() {
        let engine = PolicyEngine::new(thresholds(10, 10, 10, 10));
        let eval = engine.evaluate(&task(1_000_000), Role::Source, &DedupLedger::new());
        assert!(matches!(eval, Evaluation::Evaluated { pause: None, display: true, notify: true }));
    }

    #[test]
    fn marked_task_below_threshold_is_evaluated_normally() {
        let engine = PolicyEngine::new(thresholds(10, 10, 1000, 500));
        let mut ledger = DedupLedger::new();
        let t = task(20);
        ledger.mark(&t.task_id);
        assert!(matches!(
            engine.evaluate(&t, Role::Destination, &ledger),
            Evaluation::Evaluated { pause: None, .. }
        ));
    }

    #[test]
    fn already_paused_task_skips_remote_call() {
        let engine = PolicyEngine::new(thresholds(0, 0, 1, 1));
        let mut t = task(5);
        t.is_paused = true;
        match engine.evaluate(&t, Role::Destination, &DedupLedger::new()) {
            Evaluation::Evaluated {
                pause: Some(decision),
                ..
            } => assert!(decision.skip_remote_call),
            other => panic!("expected a pause decision, got {other:?}"),
        }
    }

    #[test]
    fn average_file_size_never_divides_by_zero() {
        assert!((average_file_size_mib(10 * MIB, 0) - 10.0).abs() < f64::EPSILON);
        assert!((average_file_size_mib(0, 0) - 0.01).abs() < f64::EPSILON);
    }

    #[test]
    fn average_file_size_is_clamped() {
        assert!((average_file_size_mib(1, 1000) - 0.01).abs() < f64::EPSILON);
        assert!((average_file_size_mib(3 * MIB, 2) - 1.5).abs() < f64::EPSILON);
    }
}
