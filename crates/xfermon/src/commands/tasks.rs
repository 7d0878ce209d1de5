//! `tasks`: list active tasks touching the monitored endpoints.

use std::pin::pin;

use bytesize::ByteSize;
use futures_util::StreamExt;
use serde::Serialize;
use tabled::Tabled;
use tracing::warn;
use xfermon_core::{EndpointId, Role, Task, TransferService};

use crate::cli::GlobalOpts;
use crate::config::Resolved;
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct EndpointTask {
    endpoint: EndpointId,
    role: Role,
    #[serde(flatten)]
    task: Task,
}

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "Endpoint")]
    endpoint: String,
    #[tabled(rename = "Role")]
    role: &'static str,
    #[tabled(rename = "Task")]
    task_id: String,
    #[tabled(rename = "Owner")]
    owner: String,
    #[tabled(rename = "Files")]
    files: String,
    #[tabled(rename = "Transferred")]
    transferred: String,
    #[tabled(rename = "Rate")]
    rate: String,
    #[tabled(rename = "Paused")]
    paused: &'static str,
}

impl From<&EndpointTask> for TaskRow {
    fn from(t: &EndpointTask) -> Self {
        Self {
            endpoint: t.endpoint.to_string(),
            role: t.role.label(),
            task_id: t.task.task_id.to_string(),
            owner: t.task.owner.clone(),
            files: format!("{}/{}", t.task.files_transferred, t.task.files),
            transferred: ByteSize::b(t.task.bytes_transferred).to_string(),
            rate: format!("{}/s", ByteSize::b(t.task.effective_bytes_per_second)),
            paused: if t.task.is_paused { "yes" } else { "no" },
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(resolved: Resolved, global: &GlobalOpts) -> Result<(), CliError> {
    let (client, _) = super::connect(&resolved)?;

    let mut rows = Vec::new();
    for endpoint in &resolved.monitor.endpoints {
        rows.extend(collect(&client, &endpoint.id).await?);
    }

    let out = output::render_list(
        global.output,
        &rows,
        |t| TaskRow::from(t),
        |t| t.task.task_id.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Drain one endpoint's feed. Undecodable records are skipped; any other
/// error aborts the listing.
async fn collect<S: TransferService>(
    service: &S,
    endpoint: &EndpointId,
) -> Result<Vec<EndpointTask>, CliError> {
    let mut feed = pin!(service.task_feed(endpoint));
    let mut tasks = Vec::new();
    while let Some(item) = feed.next().await {
        let task = match item {
            Ok(task) => task,
            Err(e) if e.is_malformed_record() => {
                warn!(error = %e, "skipping malformed task record");
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        if !task.status.is_active() {
            continue;
        }
        if let Some(role) = Role::classify(&task, endpoint) {
            tasks.push(EndpointTask {
                endpoint: endpoint.clone(),
                role,
                task,
            });
        }
    }
    Ok(tasks)
}
