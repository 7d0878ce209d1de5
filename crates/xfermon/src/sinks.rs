//! Notification sinks: console, append-only file, external command.

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::PathBuf;
use std::process::Stdio;

use chrono::Utc;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use xfermon_config::NotifyTarget;
use xfermon_core::{NotificationSink, SinkError};

/// Placeholder in command arguments replaced with the message subject.
const SUBJECT_PLACEHOLDER: &str = "{subject}";

/// The configured sink.
#[derive(Debug)]
pub enum Sink {
    Console(ConsoleSink),
    File(FileSink),
    Command(CommandSink),
}

impl From<NotifyTarget> for Sink {
    fn from(target: NotifyTarget) -> Self {
        match target {
            NotifyTarget::Console => Self::Console(ConsoleSink),
            NotifyTarget::File { path } => Self::File(FileSink { path }),
            NotifyTarget::Command { program, args } => Self::Command(CommandSink { program, args }),
        }
    }
}

impl NotificationSink for Sink {
    async fn deliver(&self, subject: &str, body: &str) -> Result<(), SinkError> {
        match self {
            Self::Console(s) => s.deliver(subject, body).await,
            Self::File(s) => s.deliver(subject, body).await,
            Self::Command(s) => s.deliver(subject, body).await,
        }
    }
}

// ── Console ──────────────────────────────────────────────────────────

/// Prints each message to stdout with numbered body lines.
#[derive(Debug)]
pub struct ConsoleSink;

impl ConsoleSink {
    fn render(subject: &str, body: &str) -> String {
        let mut out = format!("== {subject} ==\n");
        for (n, line) in body.lines().enumerate() {
            let _ = writeln!(out, "{:>6}\t{line}", n + 1);
        }
        out
    }
}

impl NotificationSink for ConsoleSink {
    async fn deliver(&self, subject: &str, body: &str) -> Result<(), SinkError> {
        let text = Self::render(subject, body);
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}

// ── File ─────────────────────────────────────────────────────────────

/// Appends each message to a file, creating it if needed.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
}

impl NotificationSink for FileSink {
    async fn deliver(&self, subject: &str, body: &str) -> Result<(), SinkError> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        let entry = format!(
            "=== {} {subject} ===\n{body}{}",
            Utc::now().to_rfc3339(),
            if body.ends_with('\n') { "" } else { "\n" }
        );
        file.write_all(entry.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

// ── Command ──────────────────────────────────────────────────────────

/// Runs a program per message (e.g. a mailer) with the body on stdin.
#[derive(Debug)]
pub struct CommandSink {
    program: String,
    args: Vec<String>,
}

impl NotificationSink for CommandSink {
    async fn deliver(&self, subject: &str, body: &str) -> Result<(), SinkError> {
        let args: Vec<String> = self
            .args
            .iter()
            .map(|a| a.replace(SUBJECT_PLACEHOLDER, subject))
            .collect();
        debug!(program = %self.program, ?args, "running notification command");

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(body.as_bytes()).await?;
            stdin.shutdown().await?;
        }

        let status = child.wait().await?;
        if status.success() {
            Ok(())
        } else {
            Err(SinkError::Command {
                program: self.program.clone(),
                status: status.to_string(),
            })
        }
    }
}
