// ── Runtime monitor configuration ──
//
// Describes what to watch and how to reach the transfer service.
// Carries the access token but never touches disk: the CLI builds a
// `MonitorConfig` from its profile and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;
use xfermon_api::{TransferClient, TransportConfig};

use crate::error::CoreError;
use crate::model::{MonitoredEndpoint, PolicyThresholds};

/// Default base URL of the web console's task activity page.
pub const DEFAULT_CONSOLE_URL: &str = "https://app.globus.org/activity/";

/// Placeholder replaced with the endpoint name in [`MonitorOptions::digest_subject`].
pub const ENDPOINT_PLACEHOLDER: &str = "{endpoint}";

/// Per-endpoint behavior shared by every monitor in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorOptions {
    /// Decide and alert as usual but never call the remote pause.
    pub dry_run: bool,
    /// Upper bound for each page fetch and each pause call.
    pub request_timeout: Duration,
    /// Prefix for the per-task link in operator alerts.
    pub console_url: String,
    /// Alert again every N failed pause attempts (0 = first failure only).
    pub failure_alert_every: u32,
    /// Digest subject template; `{endpoint}` is replaced by the endpoint name.
    pub digest_subject: String,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            request_timeout: Duration::from_secs(30),
            console_url: DEFAULT_CONSOLE_URL.into(),
            failure_alert_every: 12,
            digest_subject: "{endpoint}_many_file_xfers".into(),
        }
    }
}

impl MonitorOptions {
    pub fn digest_subject_for(&self, endpoint_name: &str) -> String {
        self.digest_subject.replace(ENDPOINT_PLACEHOLDER, endpoint_name)
    }
}

/// Everything a [`Scheduler`](crate::Scheduler) run needs.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Transfer service API base (e.g. `https://transfer.api.globus.org/v0.10/`).
    pub service_url: Url,
    pub access_token: SecretString,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// Sleep between cycles.
    pub interval: Duration,
    pub endpoints: Vec<MonitoredEndpoint>,
    pub thresholds: PolicyThresholds,
    pub dry_run: bool,
    pub console_url: String,
    pub failure_alert_every: u32,
    pub digest_subject: String,
}

impl MonitorConfig {
    /// Per-endpoint options derived from this config.
    pub fn options(&self) -> MonitorOptions {
        MonitorOptions {
            dry_run: self.dry_run,
            request_timeout: self.timeout,
            console_url: self.console_url.clone(),
            failure_alert_every: self.failure_alert_every,
            digest_subject: self.digest_subject.clone(),
        }
    }

    /// Build an authenticated client for the configured service.
    pub fn transfer_client(&self) -> Result<TransferClient, CoreError> {
        let transport = TransportConfig::default().with_timeout(self.timeout);
        Ok(TransferClient::from_access_token(
            self.service_url.as_str(),
            &self.access_token,
            &transport,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_subject_substitutes_endpoint_name() {
        let opts = MonitorOptions::default();
        assert_eq!(opts.digest_subject_for("hpss"), "hpss_many_file_xfers");
    }
}
