//! Flag-aware wrappers over `xfermon_config`.
//!
//! Applies `GlobalOpts` overrides to the selected profile and produces the
//! `MonitorConfig` plus notification target the commands run with.

use std::time::Duration;

use secrecy::SecretString;

use xfermon_config::{Config, NotifyTarget, Profile};
use xfermon_core::{MonitorConfig, MonitoredEndpoint};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use xfermon_config::{config_path, load_config, load_config_or_default};

/// Everything a monitoring command needs.
#[derive(Debug)]
pub struct Resolved {
    pub profile_name: String,
    pub monitor: MonitorConfig,
    pub notify: NotifyTarget,
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// The active profile with CLI overrides applied.
///
/// Without a matching profile, flags alone are enough when they name at
/// least one endpoint.
pub fn effective_profile(global: &GlobalOpts, config: &Config) -> Result<(String, Profile), CliError> {
    let name = active_profile_name(global, config);

    let mut profile = match config.profiles.get(&name) {
        Some(p) => p.clone(),
        None if !global.endpoints.is_empty() => Profile::default(),
        None if config.profiles.is_empty() => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
        None => {
            let mut available: Vec<_> = config.profiles.keys().cloned().collect();
            available.sort();
            return Err(CliError::ProfileNotFound {
                name,
                available: available.join(", "),
            });
        }
    };

    if let Some(ref url) = global.service_url {
        profile.service_url.clone_from(url);
    }
    if !global.endpoints.is_empty() {
        profile.endpoints = global
            .endpoints
            .iter()
            .map(|id| MonitoredEndpoint::new(id.as_str()))
            .collect();
    }
    if global.timeout.is_some() {
        profile.timeout = global.timeout;
    }
    if global.dry_run {
        profile.dry_run = true;
    }

    Ok((name, profile))
}

/// Build the monitor configuration: flags > env > profile > defaults.
pub fn resolve(
    global: &GlobalOpts,
    config: &Config,
    interval: Option<Duration>,
) -> Result<Resolved, CliError> {
    let (profile_name, profile) = effective_profile(global, config)?;

    let token = match global.access_token {
        Some(ref token) => SecretString::from(token.clone()),
        None => xfermon_config::resolve_access_token(&profile, &profile_name)?,
    };

    let mut monitor =
        xfermon_config::build_monitor_config(&profile, &profile_name, &config.defaults, token)?;
    if let Some(interval) = interval {
        monitor.interval = interval;
    }

    Ok(Resolved {
        profile_name,
        monitor,
        notify: profile.notify,
    })
}
