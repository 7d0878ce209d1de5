// ── Endpoint monitor ──
//
// One monitored endpoint: its policy engine, dedup ledger and pending
// notifications. `run_cycle` performs a single poll → classify → evaluate
// → aggregate → report pass and never fails; every remote or local error
// is logged and reflected in the returned `CycleReport`.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::MonitorOptions;
use crate::ledger::DedupLedger;
use crate::model::{EndpointId, MonitoredEndpoint, PolicyThresholds, Role, Task, TaskId};
use crate::notify::{Alert, NotificationBuffer, NotificationSink};
use crate::policy::{Evaluation, PauseDecision, PauseRule, PolicyEngine};
use crate::service::TransferService;
use crate::stats::CycleTotals;

/// Column header printed above the task lines of a cycle.
pub fn cycle_header(endpoint_name: &str) -> String {
    format!("...{endpoint_name}....task.[ACTIVE]....Nfiles.....owner...")
}

// ── Report types ─────────────────────────────────────────────────────

/// One task line for the console or the notification digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportLine {
    pub role: Role,
    pub task_id: TaskId,
    pub files: u64,
    pub owner: String,
}

impl ReportLine {
    fn new(role: Role, task: &Task) -> Self {
        Self {
            role,
            task_id: task.task_id.clone(),
            files: task.files,
            owner: task.owner.clone(),
        }
    }

    pub fn console_line(&self) -> String {
        format!(
            "{:<10} {:<36} {:>10} {}",
            self.role.label(),
            self.task_id,
            self.files,
            self.owner
        )
    }

    pub fn digest_line(&self) -> String {
        format!(
            "{:<5} {:<36} {:>10} {}",
            self.role.label(),
            self.task_id,
            self.files,
            self.owner
        )
    }
}

/// What happened when a pause rule fired for a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PauseOutcome {
    /// The service accepted the pause request.
    Paused,
    /// The service already reported the task paused; no call was made.
    AlreadyPausedRemotely,
    /// Dry-run mode: decision recorded, no call made.
    DryRun,
    /// Paused earlier in this run; nothing done.
    AlreadyHandled,
    /// The pause call failed or timed out; it is retried next cycle.
    Failed {
        error: String,
        attempts: u32,
        alert_queued: bool,
    },
}

impl PauseOutcome {
    /// The task is in the ledger after this outcome.
    pub fn is_marked(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PauseAction {
    pub task_id: TaskId,
    pub owner: String,
    pub files: u64,
    pub rule: PauseRule,
    #[serde(flatten)]
    pub outcome: PauseOutcome,
}

/// Result of flushing the notification buffer at the end of a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NotifyStatus {
    /// Nothing was pending.
    Nothing,
    Delivered { alerts: usize, lines: usize },
    /// Delivery failed; the undelivered content stays buffered.
    Failed {
        error: String,
        retained_alerts: usize,
        retained_lines: usize,
    },
}

/// Everything one cycle observed and did for one endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub endpoint: EndpointId,
    pub endpoint_name: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Lines above the display threshold, in feed order.
    pub displayed: Vec<ReportLine>,
    pub actions: Vec<PauseAction>,
    pub totals: CycleTotals,
    /// Active tasks processed.
    pub tasks_seen: usize,
    /// Records skipped because they could not be decoded or classified.
    pub skipped_records: usize,
    /// Set when the listing ended early; the report covers the tasks
    /// seen before the failure.
    pub fetch_error: Option<String>,
    pub notify: NotifyStatus,
}

impl CycleReport {
    fn start(endpoint: EndpointId, endpoint_name: String) -> Self {
        let now = Utc::now();
        Self {
            endpoint,
            endpoint_name,
            started_at: now,
            finished_at: now,
            displayed: Vec::new(),
            actions: Vec::new(),
            totals: CycleTotals::default(),
            tasks_seen: 0,
            skipped_records: 0,
            fetch_error: None,
            notify: NotifyStatus::Nothing,
        }
    }

    pub fn header(&self) -> String {
        cycle_header(&self.endpoint_name)
    }

    /// Actions that issued (or, in dry-run mode, would have issued) a pause.
    pub fn new_pauses(&self) -> impl Iterator<Item = &PauseAction> {
        self.actions.iter().filter(|a| {
            matches!(
                a.outcome,
                PauseOutcome::Paused | PauseOutcome::AlreadyPausedRemotely | PauseOutcome::DryRun
            )
        })
    }

    pub fn failed_pauses(&self) -> impl Iterator<Item = &PauseAction> {
        self.actions
            .iter()
            .filter(|a| matches!(a.outcome, PauseOutcome::Failed { .. }))
    }
}

// ── EndpointMonitor ──────────────────────────────────────────────────

/// Per-endpoint state carried across cycles.
#[derive(Debug)]
pub struct EndpointMonitor {
    endpoint: MonitoredEndpoint,
    resolved_name: Option<String>,
    engine: PolicyEngine,
    ledger: DedupLedger,
    buffer: NotificationBuffer,
    options: MonitorOptions,
}

impl EndpointMonitor {
    pub fn new(
        endpoint: MonitoredEndpoint,
        thresholds: PolicyThresholds,
        options: MonitorOptions,
    ) -> Self {
        Self {
            endpoint,
            resolved_name: None,
            engine: PolicyEngine::new(thresholds),
            ledger: DedupLedger::new(),
            buffer: NotificationBuffer::new(),
            options,
        }
    }

    pub fn endpoint(&self) -> &MonitoredEndpoint {
        &self.endpoint
    }

    pub fn ledger(&self) -> &DedupLedger {
        &self.ledger
    }

    /// Notification content still waiting for delivery.
    pub fn pending(&self) -> &NotificationBuffer {
        &self.buffer
    }

    /// Run one cycle against `service`, delivering notifications to `sink`.
    pub async fn run_cycle<S, N>(&mut self, service: &S, sink: &N) -> CycleReport
    where
        S: TransferService,
        N: NotificationSink,
    {
        let name = self.resolve_name(service).await;
        let endpoint_id = self.endpoint.id.clone();
        let mut report = CycleReport::start(endpoint_id.clone(), name.clone());
        let timeout = self.options.request_timeout;

        let mut listed = HashSet::new();

        debug!(endpoint = %endpoint_id, "polling active tasks");
        let feed = service.task_feed(&endpoint_id);
        tokio::pin!(feed);
        loop {
            let item = match tokio::time::timeout(timeout, feed.next()).await {
                Ok(Some(item)) => item,
                Ok(None) => break,
                Err(_) => {
                    let error = format!("task listing timed out after {}s", timeout.as_secs());
                    warn!(endpoint = %endpoint_id, %error, "listing incomplete");
                    report.fetch_error = Some(error);
                    break;
                }
            };
            match item {
                Ok(task) => {
                    listed.insert(task.task_id.clone());
                    self.process_task(service, &endpoint_id, &task, &mut report).await;
                }
                Err(e) if e.is_malformed_record() => {
                    warn!(endpoint = %endpoint_id, error = %e, "skipping task record");
                    report.skipped_records += 1;
                }
                Err(e) => {
                    warn!(endpoint = %endpoint_id, error = %e, "listing incomplete");
                    report.fetch_error = Some(e.to_string());
                    break;
                }
            }
        }

        // A partial listing says nothing about the tasks it never reached.
        if report.fetch_error.is_none() {
            self.ledger.retain_failures(&listed);
        }

        let subject = self.options.digest_subject_for(&name);
        report.notify = match self.buffer.flush(sink, &subject, timeout).await {
            Ok((0, 0)) => NotifyStatus::Nothing,
            Ok((alerts, lines)) => NotifyStatus::Delivered { alerts, lines },
            Err(e) => {
                warn!(
                    endpoint = %endpoint_id,
                    error = %e,
                    alerts = self.buffer.alert_count(),
                    lines = self.buffer.line_count(),
                    "notification delivery failed; retained for next cycle"
                );
                NotifyStatus::Failed {
                    error: e.to_string(),
                    retained_alerts: self.buffer.alert_count(),
                    retained_lines: self.buffer.line_count(),
                }
            }
        };

        report.finished_at = Utc::now();
        info!(
            endpoint = %endpoint_id,
            tasks = report.tasks_seen,
            pauses = report.new_pauses().count(),
            skipped = report.skipped_records,
            complete = report.fetch_error.is_none(),
            "cycle finished"
        );
        report
    }

    async fn resolve_name<S: TransferService>(&mut self, service: &S) -> String {
        if let Some(name) = self.endpoint.name.as_ref().or(self.resolved_name.as_ref()) {
            return name.clone();
        }
        let lookup = service.endpoint_name(&self.endpoint.id);
        match tokio::time::timeout(self.options.request_timeout, lookup).await {
            Ok(Ok(name)) => {
                debug!(endpoint = %self.endpoint.id, %name, "resolved endpoint name");
                self.resolved_name = Some(name.clone());
                name
            }
            Ok(Err(e)) => {
                warn!(endpoint = %self.endpoint.id, error = %e, "endpoint name lookup failed");
                self.endpoint.id.to_string()
            }
            Err(_) => {
                warn!(endpoint = %self.endpoint.id, "endpoint name lookup timed out");
                self.endpoint.id.to_string()
            }
        }
    }

    async fn process_task<S: TransferService>(
        &mut self,
        service: &S,
        endpoint_id: &EndpointId,
        task: &Task,
        report: &mut CycleReport,
    ) {
        if !task.status.is_active() {
            debug!(task_id = %task.task_id, status = ?task.status, "ignoring inactive task");
            return;
        }
        let Some(role) = Role::classify(task, endpoint_id) else {
            warn!(task_id = %task.task_id, "task touches neither side of the endpoint");
            report.skipped_records += 1;
            return;
        };
        report.tasks_seen += 1;
        report.totals.record(role, task);

        match self.engine.evaluate(task, role, &self.ledger) {
            Evaluation::AlreadyHandled { rule } => {
                info!(task_id = %task.task_id, owner = %task.owner, "task was already PAUSED");
                report.actions.push(PauseAction {
                    task_id: task.task_id.clone(),
                    owner: task.owner.clone(),
                    files: task.files,
                    rule,
                    outcome: PauseOutcome::AlreadyHandled,
                });
            }
            Evaluation::Evaluated {
                pause,
                display,
                notify,
            } => {
                if let Some(decision) = pause {
                    let outcome = self.apply_pause(service, task, &decision).await;
                    report.actions.push(PauseAction {
                        task_id: task.task_id.clone(),
                        owner: task.owner.clone(),
                        files: task.files,
                        rule: decision.rule,
                        outcome,
                    });
                }
                let line = ReportLine::new(role, task);
                if notify {
                    self.buffer.append(&task.task_id, line.digest_line());
                }
                if display {
                    report.displayed.push(line);
                }
            }
        }
    }

    async fn apply_pause<S: TransferService>(
        &mut self,
        service: &S,
        task: &Task,
        decision: &PauseDecision,
    ) -> PauseOutcome {
        let outcome = if self.options.dry_run {
            info!(task_id = %task.task_id, owner = %task.owner, rule = ?decision.rule, "dry run: would pause task");
            PauseOutcome::DryRun
        } else if decision.skip_remote_call {
            info!(task_id = %task.task_id, owner = %task.owner, "task already paused by the service");
            PauseOutcome::AlreadyPausedRemotely
        } else {
            let ids = std::slice::from_ref(&task.task_id);
            let call = service.pause(ids, &decision.justification);
            match tokio::time::timeout(self.options.request_timeout, call).await {
                Ok(Ok(())) => {
                    info!(task_id = %task.task_id, owner = %task.owner, files = task.files, "PAUSED task");
                    PauseOutcome::Paused
                }
                Ok(Err(e)) => return self.pause_failed(task, decision, e.to_string()),
                Err(_) => {
                    let error = format!(
                        "pause timed out after {}s",
                        self.options.request_timeout.as_secs()
                    );
                    return self.pause_failed(task, decision, error);
                }
            }
        };

        self.ledger.mark(&task.task_id);
        let alert = self.pause_alert(task, decision, &outcome);
        self.buffer.push_alert(alert);
        outcome
    }

    fn pause_failed(&mut self, task: &Task, decision: &PauseDecision, error: String) -> PauseOutcome {
        let failure = self
            .ledger
            .record_failure(&task.task_id, self.options.failure_alert_every);
        warn!(
            task_id = %task.task_id,
            attempts = failure.attempts,
            %error,
            "pause failed; retrying next cycle"
        );
        if failure.alert_due {
            self.buffer.push_alert(Alert {
                subject: format!("PAUSE_FAILED:{}", task.owner),
                body: format!(
                    "{}\n\nPause attempt {} failed: {error}\n\n{}\n",
                    self.task_link(&task.task_id),
                    failure.attempts,
                    decision.justification
                ),
            });
        }
        PauseOutcome::Failed {
            error,
            attempts: failure.attempts,
            alert_queued: failure.alert_due,
        }
    }

    fn pause_alert(&self, task: &Task, decision: &PauseDecision, outcome: &PauseOutcome) -> Alert {
        let mut body = format!(
            "{}\n\n{}\n",
            self.task_link(&task.task_id),
            decision.justification
        );
        match outcome {
            PauseOutcome::DryRun => body.push_str("\n(dry run: no pause request was sent)\n"),
            PauseOutcome::AlreadyPausedRemotely => {
                body.push_str("\n(task was already paused by the service)\n");
            }
            _ => {}
        }
        let dump = serde_json::to_string_pretty(task)
            .unwrap_or_else(|e| format!("<task could not be rendered: {e}>"));
        body.push('\n');
        body.push_str(&dump);
        body.push('\n');

        Alert {
            subject: format!("{}:{}", decision.rule.alert_tag(), task.owner),
            body,
        }
    }

    fn task_link(&self, task_id: &TaskId) -> String {
        format!("{}{task_id}", self.options.console_url)
    }
}
