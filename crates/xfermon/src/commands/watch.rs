//! `watch`: cycle until interrupted.

use std::future::Future;
use std::io;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use xfermon_core::{Scheduler, SchedulerEvent};

use crate::cli::GlobalOpts;
use crate::config::Resolved;
use crate::error::CliError;
use crate::output;

pub async fn handle(resolved: Resolved, global: &GlobalOpts) -> Result<(), CliError> {
    let (client, sink) = super::connect(&resolved)?;
    let renderer = super::renderer(global);
    let mut scheduler = Scheduler::new(client, sink, &resolved.monitor);

    let cancel = CancellationToken::new();
    tokio::spawn(shutdown_on_signal(cancel.clone()));

    info!(
        profile = %resolved.profile_name,
        endpoints = resolved.monitor.endpoints.len(),
        interval = %humantime::format_duration(resolved.monitor.interval),
        dry_run = resolved.monitor.dry_run,
        "watch started"
    );

    let quiet = global.quiet;
    let cycles = scheduler
        .run(&cancel, |event| match event {
            SchedulerEvent::Report(report) => match renderer.report(report) {
                Ok(text) => output::print_output(&text, quiet),
                Err(e) => warn!(error = %e, "failed to render cycle report"),
            },
            SchedulerEvent::Sleeping(interval) => {
                if let Some(text) = renderer.sleeping(interval) {
                    output::print_output(&text, quiet);
                }
            }
        })
        .await;

    info!(cycles, "watch stopped");
    Ok(())
}

/// Cancel on Ctrl-C, or SIGTERM on unix.
async fn shutdown_on_signal(cancel: CancellationToken) {
    first_signal(tokio::signal::ctrl_c(), terminate()).await;
    info!("shutdown requested");
    cancel.cancel();
}

/// Resolve when either listener reports a signal. A listener that cannot
/// be installed is logged and never fires, so it can't trigger a shutdown.
async fn first_signal(
    ctrl_c: impl Future<Output = io::Result<()>>,
    terminate: impl Future<Output = io::Result<()>>,
) {
    tokio::select! {
        () = listen("Ctrl-C", ctrl_c) => {}
        () = listen("SIGTERM", terminate) => {}
    }
}

async fn listen(name: &str, signal: impl Future<Output = io::Result<()>>) {
    if let Err(e) = signal.await {
        warn!(signal = name, error = %e, "cannot listen for signal");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn terminate() -> io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    signal(SignalKind::terminate())?.recv().await;
    Ok(())
}

#[cfg(not(unix))]
async fn terminate() -> io::Result<()> {
    std::future::pending().await
}
