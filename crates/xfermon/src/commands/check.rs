//! `check`: one cycle over every endpoint, then exit.

use tracing::info;
use xfermon_core::Scheduler;

use crate::cli::GlobalOpts;
use crate::config::Resolved;
use crate::error::CliError;
use crate::output;

pub async fn handle(resolved: Resolved, global: &GlobalOpts) -> Result<(), CliError> {
    let (client, sink) = super::connect(&resolved)?;
    let renderer = super::renderer(global);
    let mut scheduler = Scheduler::new(client, sink, &resolved.monitor);

    info!(profile = %resolved.profile_name, "running a single cycle");
    let reports = scheduler.run_once().await;

    for report in &reports {
        output::print_output(&renderer.report(report)?, global.quiet);
    }

    let incomplete: Vec<&str> = reports
        .iter()
        .filter(|r| r.fetch_error.is_some())
        .map(|r| r.endpoint_name.as_str())
        .collect();
    if incomplete.is_empty() {
        Ok(())
    } else {
        Err(CliError::CycleIncomplete {
            count: incomplete.len(),
            endpoints: incomplete.join(", "),
        })
    }
}
