//! Shared configuration for xfermon.
//!
//! TOML profiles, access-token resolution (env + keyring + plaintext),
//! and translation to `xfermon_core::MonitorConfig`. The binary adds
//! flag-aware wrappers on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use xfermon_core::config::DEFAULT_CONSOLE_URL;
use xfermon_core::{MonitorConfig, MonitoredEndpoint, PolicyThresholds};

/// Environment variable consulted after the profile's `access_token_env`.
pub const ACCESS_TOKEN_ENV: &str = "XFERMON_ACCESS_TOKEN";

/// Keyring service name; the user is `<profile>/access-token`.
pub const KEYRING_SERVICE: &str = "xfermon";

pub const DEFAULT_SERVICE_URL: &str = "https://transfer.api.globus.org/v0.10/";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no access token configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{profile}' has no endpoints to monitor")]
    NoEndpoints { profile: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

/// Values used when a profile leaves them unset.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// HTTP timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Sleep between cycles in seconds.
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    #[serde(default = "default_console_url")]
    pub console_url: String,

    #[serde(default = "default_failure_alert_every")]
    pub failure_alert_every: u32,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            interval_secs: default_interval(),
            console_url: default_console_url(),
            failure_alert_every: default_failure_alert_every(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_interval() -> u64 {
    3600
}
fn default_console_url() -> String {
    DEFAULT_CONSOLE_URL.into()
}
fn default_failure_alert_every() -> u32 {
    12
}
fn default_service_url() -> String {
    DEFAULT_SERVICE_URL.into()
}

/// Where digests and operator alerts go.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotifyTarget {
    /// Print to stdout.
    #[default]
    Console,
    /// Append to a file.
    File { path: PathBuf },
    /// Run a program per message: `{subject}` in `args` is replaced by the
    /// subject and the body is written to its stdin.
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
}

/// A named monitoring profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Transfer service API base URL.
    #[serde(default = "default_service_url")]
    pub service_url: String,

    /// Access token (plaintext; prefer keyring or env var).
    pub access_token: Option<String>,

    /// Environment variable name containing the access token.
    pub access_token_env: Option<String>,

    #[serde(default)]
    pub endpoints: Vec<MonitoredEndpoint>,

    #[serde(default)]
    pub thresholds: PolicyThresholds,

    /// Override interval.
    pub interval_secs: Option<u64>,

    /// Override timeout.
    pub timeout: Option<u64>,

    #[serde(default)]
    pub dry_run: bool,

    pub console_url: Option<String>,

    pub failure_alert_every: Option<u32>,

    /// Digest subject template; `{endpoint}` is the endpoint name.
    pub digest_subject: Option<String>,

    #[serde(default)]
    pub notify: NotifyTarget,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            service_url: default_service_url(),
            access_token: None,
            access_token_env: None,
            endpoints: Vec::new(),
            thresholds: PolicyThresholds::default(),
            interval_secs: None,
            timeout: None,
            dry_run: false,
            console_url: None,
            failure_alert_every: None,
            digest_subject: None,
            notify: NotifyTarget::default(),
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "xfermon", "xfermon").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("xfermon");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` (missing file is fine) with the `XFERMON_` env
/// overlay on top. Nested keys use `__`, e.g.
/// `XFERMON_PROFILES__PROD__DRY_RUN=true`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("XFERMON_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it cannot be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Token resolution ────────────────────────────────────────────────

/// Resolve the access token from the credential chain (no CLI flag step):
/// profile `access_token_env`, then `XFERMON_ACCESS_TOKEN`, then the
/// system keyring, then plaintext in the profile.
pub fn resolve_access_token(
    profile: &Profile,
    profile_name: &str,
) -> Result<SecretString, ConfigError> {
    // 1. Profile's access_token_env → env var lookup
    if let Some(ref env_name) = profile.access_token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. Well-known env var
    if let Ok(val) = std::env::var(ACCESS_TOKEN_ENV) {
        return Ok(SecretString::from(val));
    }

    // 3. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/access-token"))
    {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 4. Plaintext in config
    if let Some(ref token) = profile.access_token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

// ── Translation to MonitorConfig ────────────────────────────────────

/// Validate `profile` and combine it with `defaults` and an already
/// resolved token.
pub fn build_monitor_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    access_token: SecretString,
) -> Result<MonitorConfig, ConfigError> {
    let service_url: url::Url =
        profile
            .service_url
            .parse()
            .map_err(|e| ConfigError::Validation {
                field: "service_url".into(),
                reason: format!("invalid URL '{}': {e}", profile.service_url),
            })?;
    if !matches!(service_url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "service_url".into(),
            reason: format!("expected an http(s) URL, got '{service_url}'"),
        });
    }

    if profile.endpoints.is_empty() {
        return Err(ConfigError::NoEndpoints {
            profile: profile_name.into(),
        });
    }
    if let Some(blank) = profile.endpoints.iter().find(|ep| ep.id.as_str().trim().is_empty()) {
        return Err(ConfigError::Validation {
            field: "endpoints".into(),
            reason: format!("endpoint id must not be empty (name: {})", blank.label()),
        });
    }

    let interval_secs = profile.interval_secs.unwrap_or(defaults.interval_secs);
    if interval_secs == 0 {
        return Err(ConfigError::Validation {
            field: "interval_secs".into(),
            reason: "must be greater than zero".into(),
        });
    }
    let timeout_secs = profile.timeout.unwrap_or(defaults.timeout);
    if timeout_secs == 0 {
        return Err(ConfigError::Validation {
            field: "timeout".into(),
            reason: "must be greater than zero".into(),
        });
    }

    let digest_subject = profile
        .digest_subject
        .clone()
        .unwrap_or_else(|| xfermon_core::MonitorOptions::default().digest_subject);

    Ok(MonitorConfig {
        service_url,
        access_token,
        timeout: Duration::from_secs(timeout_secs),
        interval: Duration::from_secs(interval_secs),
        endpoints: profile.endpoints.clone(),
        thresholds: profile.thresholds,
        dry_run: profile.dry_run,
        console_url: profile
            .console_url
            .clone()
            .unwrap_or_else(|| defaults.console_url.clone()),
        failure_alert_every: profile
            .failure_alert_every
            .unwrap_or(defaults.failure_alert_every),
        digest_subject,
    })
}

/// Build a `MonitorConfig` from a profile, resolving the token from the
/// credential chain. No CLI flag overrides.
pub fn profile_to_monitor_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<MonitorConfig, ConfigError> {
    let token = resolve_access_token(profile, profile_name)?;
    build_monitor_config(profile, profile_name, defaults, token)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use figment::Jail;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn profile_with(endpoints: &[&str]) -> Profile {
        Profile {
            endpoints: endpoints.iter().map(|id| MonitoredEndpoint::new(*id)).collect(),
            ..Profile::default()
        }
    }

    #[test]
    fn loads_profiles_from_toml() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                default_profile = "hpss"

                [defaults]
                interval_secs = 600

                [profiles.hpss]
                access_token_env = "HPSS_TOKEN"
                endpoints = [{ id = "ep-1", name = "hpss-dtn" }, { id = "ep-2" }]
                dry_run = true

                [profiles.hpss.thresholds]
                pause_threshold = 5000

                [profiles.hpss.notify]
                kind = "command"
                program = "mail"
                args = ["-s", "{subject}", "ops@example.org"]
                "#,
            )?;

            let cfg = load_config_from(Path::new("config.toml")).map_err(|e| e.to_string())?;
            assert_eq!(cfg.default_profile.as_deref(), Some("hpss"));
            assert_eq!(cfg.defaults.interval_secs, 600);
            assert_eq!(cfg.defaults.timeout, 30);

            let hpss = &cfg.profiles["hpss"];
            assert_eq!(hpss.service_url, DEFAULT_SERVICE_URL);
            assert_eq!(hpss.endpoints.len(), 2);
            assert_eq!(hpss.endpoints[0].label(), "hpss-dtn");
            assert_eq!(hpss.endpoints[1].label(), "ep-2");
            assert_eq!(hpss.thresholds.pause_threshold, 5000);
            assert_eq!(hpss.thresholds.same_endpoint_pause_threshold, 500);
            assert!(hpss.dry_run);
            assert_eq!(
                hpss.notify,
                NotifyTarget::Command {
                    program: "mail".into(),
                    args: vec!["-s".into(), "{subject}".into(), "ops@example.org".into()],
                }
            );
            Ok(())
        });
    }

    #[test]
    fn env_overlay_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [profiles.prod]
                endpoints = [{ id = "ep-1" }]
                "#,
            )?;
            jail.set_env("XFERMON_PROFILES__PROD__DRY_RUN", "true");
            jail.set_env("XFERMON_PROFILES__PROD__THRESHOLDS__NOTIFY_THRESHOLD", "42");

            let cfg = load_config_from(Path::new("config.toml")).map_err(|e| e.to_string())?;
            let prod = &cfg.profiles["prod"];
            assert!(prod.dry_run);
            assert_eq!(prod.thresholds.notify_threshold, 42);
            assert_eq!(prod.endpoints.len(), 1);
            Ok(())
        });
    }

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|_jail| {
            let cfg = load_config_from(Path::new("absent.toml")).map_err(|e| e.to_string())?;
            assert_eq!(cfg.default_profile.as_deref(), Some("default"));
            assert!(cfg.profiles.is_empty());
            assert_eq!(cfg.defaults.interval_secs, 3600);
            Ok(())
        });
    }

    #[test]
    fn profile_env_var_wins_token_chain() {
        Jail::expect_with(|jail| {
            jail.set_env("HPSS_TOKEN", "from-env");
            let profile = Profile {
                access_token_env: Some("HPSS_TOKEN".into()),
                access_token: Some("plaintext".into()),
                ..profile_with(&["ep"])
            };
            let token = resolve_access_token(&profile, "hpss").map_err(|e| e.to_string())?;
            assert_eq!(token.expose_secret(), "from-env");
            Ok(())
        });
    }

    #[test]
    fn profile_translation_uses_well_known_token_var() {
        Jail::expect_with(|jail| {
            jail.set_env(ACCESS_TOKEN_ENV, "from-well-known");
            let cfg = profile_to_monitor_config(&profile_with(&["ep-1"]), "p", &Defaults::default())
                .map_err(|e| e.to_string())?;
            assert_eq!(cfg.access_token.expose_secret(), "from-well-known");
            assert_eq!(cfg.endpoints.len(), 1);
            Ok(())
        });
    }

    #[test]
    fn builds_monitor_config_with_defaults() {
        let profile = profile_with(&["ep-1"]);
        let cfg = build_monitor_config(
            &profile,
            "p",
            &Defaults::default(),
            SecretString::from("tok".to_owned()),
        )
        .unwrap();

        assert_eq!(cfg.service_url.as_str(), DEFAULT_SERVICE_URL);
        assert_eq!(cfg.interval, Duration::from_secs(3600));
        assert_eq!(cfg.timeout, Duration::from_secs(30));
        assert_eq!(cfg.failure_alert_every, 12);
        assert_eq!(cfg.console_url, DEFAULT_CONSOLE_URL);
        assert_eq!(cfg.digest_subject, "{endpoint}_many_file_xfers");
        assert!(!cfg.dry_run);
    }

    #[test]
    fn rejects_empty_endpoint_list() {
        let err = build_monitor_config(
            &profile_with(&[]),
            "p",
            &Defaults::default(),
            SecretString::from("tok".to_owned()),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::NoEndpoints { .. }));
    }

    #[test]
    fn rejects_zero_interval_and_bad_url() {
        let zero = Profile {
            interval_secs: Some(0),
            ..profile_with(&["ep"])
        };
        let err = build_monitor_config(&zero, "p", &Defaults::default(), SecretString::from("t".to_owned()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "interval_secs"));

        let bad_url = Profile {
            service_url: "not a url".into(),
            ..profile_with(&["ep"])
        };
        let err = build_monitor_config(&bad_url, "p", &Defaults::default(), SecretString::from("t".to_owned()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "service_url"));
    }
}
