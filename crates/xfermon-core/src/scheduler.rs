// ── Cycle scheduler ──
//
// Drives every endpoint monitor through one cycle, then sleeps for the
// fixed interval, until the cancellation token fires. Cancellation is
// honored while sleeping and between endpoints; a cycle already running
// for an endpoint always completes.

use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::MonitorConfig;
use crate::monitor::{CycleReport, EndpointMonitor};
use crate::notify::NotificationSink;
use crate::service::TransferService;

/// Scheduler state, observable through [`Scheduler::state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Polling,
    Sleeping,
    /// `run` returned after cancellation.
    Stopped,
}

/// Progress callbacks from [`Scheduler::run`].
#[derive(Debug)]
pub enum SchedulerEvent<'a> {
    /// An endpoint finished its cycle.
    Report(&'a CycleReport),
    /// All endpoints polled; sleeping for the given interval.
    Sleeping(Duration),
}

pub struct Scheduler<S, N> {
    service: S,
    sink: N,
    monitors: Vec<EndpointMonitor>,
    interval: Duration,
    state: watch::Sender<CycleState>,
}

impl<S, N> Scheduler<S, N>
where
    S: TransferService,
    N: NotificationSink,
{
    /// One monitor per configured endpoint, each with its own ledger.
    pub fn new(service: S, sink: N, config: &MonitorConfig) -> Self {
        let options = config.options();
        let monitors = config
            .endpoints
            .iter()
            .map(|ep| EndpointMonitor::new(ep.clone(), config.thresholds, options.clone()))
            .collect();
        Self::with_monitors(service, sink, monitors, config.interval)
    }

    pub fn with_monitors(
        service: S,
        sink: N,
        monitors: Vec<EndpointMonitor>,
        interval: Duration,
    ) -> Self {
        let (state, _) = watch::channel(CycleState::Polling);
        Self {
            service,
            sink,
            monitors,
            interval,
            state,
        }
    }

    pub fn state(&self) -> watch::Receiver<CycleState> {
        self.state.subscribe()
    }

    pub fn monitors(&self) -> &[EndpointMonitor] {
        &self.monitors
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Poll every endpoint once, in configuration order.
    pub async fn run_once(&mut self) -> Vec<CycleReport> {
        self.state.send_replace(CycleState::Polling);
        let mut reports = Vec::with_capacity(self.monitors.len());
        for monitor in &mut self.monitors {
            reports.push(monitor.run_cycle(&self.service, &self.sink).await);
        }
        reports
    }

    /// Cycle until `cancel` fires. Returns the number of completed cycles.
    pub async fn run<F>(&mut self, cancel: &CancellationToken, mut on_event: F) -> u64
    where
        F: FnMut(SchedulerEvent<'_>),
    {
        let mut cycles = 0_u64;
        'cycles: while !cancel.is_cancelled() {
            self.state.send_replace(CycleState::Polling);
            debug!(cycle = cycles + 1, endpoints = self.monitors.len(), "cycle starting");

            for monitor in &mut self.monitors {
                if cancel.is_cancelled() {
                    info!("shutdown requested; skipping remaining endpoints");
                    break 'cycles;
                }
                let report = monitor.run_cycle(&self.service, &self.sink).await;
                on_event(SchedulerEvent::Report(&report));
            }
            cycles += 1;

            self.state.send_replace(CycleState::Sleeping);
            on_event(SchedulerEvent::Sleeping(self.interval));
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(self.interval) => {}
            }
        }

        self.state.send_replace(CycleState::Stopped);
        info!(cycles, "monitor stopped");
        cycles
    }
}
