//! Console rendering of cycle reports.

use std::fmt::Write as _;
use std::time::Duration;

use owo_colors::OwoColorize;

use xfermon_core::{CycleReport, NotifyStatus, PauseAction, PauseOutcome, PauseRule};

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::output;

/// Renders reports and sleep notices in the selected output format.
#[derive(Debug, Clone, Copy)]
pub struct ReportRenderer {
    format: OutputFormat,
    color: bool,
}

impl ReportRenderer {
    pub fn new(format: OutputFormat, color: bool) -> Self {
        Self { format, color }
    }

    pub fn report(&self, report: &CycleReport) -> Result<String, CliError> {
        match self.format {
            OutputFormat::Table => Ok(self.console(report)),
            OutputFormat::Plain => Ok(report
                .new_pauses()
                .map(|a| a.task_id.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            structured => output::render_structured(structured, report),
        }
    }

    /// Only the console format announces the sleep.
    pub fn sleeping(&self, interval: Duration) -> Option<String> {
        (self.format == OutputFormat::Table)
            .then(|| format!("...sleeping {}...", humantime::format_duration(interval)))
    }

    fn console(&self, report: &CycleReport) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", report.header());
        for line in &report.displayed {
            let _ = writeln!(out, "{}", line.console_line());
        }
        for action in &report.actions {
            let _ = writeln!(out, "{}", self.action_line(action));
        }
        if let Some(ref err) = report.fetch_error {
            let _ = writeln!(out, "{}", self.warn(&format!("listing incomplete: {err}")));
        }
        if report.skipped_records > 0 {
            let _ = writeln!(out, "skipped {} malformed task record(s)", report.skipped_records);
        }
        if let NotifyStatus::Failed {
            ref error,
            retained_alerts,
            retained_lines,
        } = report.notify
        {
            let _ = writeln!(
                out,
                "{}",
                self.warn(&format!(
                    "notification failed ({error}); keeping {retained_alerts} alert(s), {retained_lines} line(s)"
                ))
            );
        }
        out.push_str(&report.totals.to_string());
        out.truncate(out.trim_end().len());
        out
    }

    fn action_line(&self, action: &PauseAction) -> String {
        let reason = match action.rule {
            PauseRule::SelfLoop => "source equals destination",
            PauseRule::OversizedDestination => "too many files",
        };
        let subject = format!("{} ({}, {} files)", action.task_id, action.owner, action.files);
        match action.outcome {
            PauseOutcome::Paused => format!("{} {subject}: {reason}", self.good("PAUSED")),
            PauseOutcome::AlreadyPausedRemotely => {
                format!("{} {subject}: already paused by the service", self.good("PAUSED"))
            }
            PauseOutcome::DryRun => format!("{} would pause {subject}: {reason}", self.dim("DRY-RUN")),
            PauseOutcome::AlreadyHandled => {
                format!("{} for {} was already PAUSED.", action.task_id, action.owner)
            }
            PauseOutcome::Failed {
                ref error,
                attempts,
                ..
            } => format!("{} {subject}: {error} (attempt {attempts})", self.bad("FAILED")),
        }
    }

    fn good(&self, s: &str) -> String {
        if self.color { s.green().bold().to_string() } else { s.to_owned() }
    }

    fn bad(&self, s: &str) -> String {
        if self.color { s.red().bold().to_string() } else { s.to_owned() }
    }

    fn warn(&self, s: &str) -> String {
        if self.color { s.yellow().to_string() } else { s.to_owned() }
    }

    fn dim(&self, s: &str) -> String {
        if self.color { s.dimmed().to_string() } else { s.to_owned() }
    }
}
