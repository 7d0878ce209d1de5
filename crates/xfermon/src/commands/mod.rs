//! Command dispatch: bridges CLI args -> core monitor -> output formatting.

pub mod check;
pub mod config_cmd;
pub mod tasks;
pub mod watch;

use xfermon_core::{CoreError, TransferClient};

use crate::cli::{Command, GlobalOpts};
use crate::config::{self, Resolved};
use crate::error::CliError;
use crate::output;
use crate::render::ReportRenderer;
use crate::sinks::Sink;

/// Dispatch a service-bound command to its handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load_config()?;
    match cmd {
        Command::Watch(args) => {
            let resolved = config::resolve(global, &cfg, args.interval)?;
            watch::handle(resolved, global).await
        }
        Command::Check => check::handle(config::resolve(global, &cfg, None)?, global).await,
        Command::Tasks => tasks::handle(config::resolve(global, &cfg, None)?, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}

/// The client and sink every monitoring command runs with.
fn connect(resolved: &Resolved) -> Result<(TransferClient, Sink), CoreError> {
    let client = resolved.monitor.transfer_client()?;
    Ok((client, Sink::from(resolved.notify.clone())))
}

fn renderer(global: &GlobalOpts) -> ReportRenderer {
    ReportRenderer::new(global.output, output::should_color(global.color))
}
