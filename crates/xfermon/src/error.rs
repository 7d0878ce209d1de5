//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use xfermon_config::ConfigError;
use xfermon_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const INCOMPLETE: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the transfer service at {url}: {reason}")]
    #[diagnostic(
        code(xfermon::connection_failed),
        help(
            "Check network access to the service.\n\
             URL: {url}\n\
             Override it with --service-url or the profile's service_url."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Rate limited by the transfer service")]
    #[diagnostic(
        code(xfermon::rate_limited),
        help("Retry after {retry_after_secs}s, or lengthen the watch interval.")
    )]
    RateLimited { retry_after_secs: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(xfermon::auth_failed),
        help(
            "The access token was rejected or lacks the endpoint-manager scope.\n\
             Store a fresh one with: xfermon config set-token"
        )
    )]
    AuthFailed { message: String },

    #[error("No access token configured for profile '{profile}'")]
    #[diagnostic(
        code(xfermon::no_credentials),
        help(
            "Pass --access-token, set XFERMON_ACCESS_TOKEN, set access_token_env in\n\
             the profile, or run: xfermon config set-token --profile {profile}"
        )
    )]
    NoCredentials { profile: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(code(xfermon::profile_not_found), help("Available profiles: {available}"))]
    ProfileNotFound { name: String, available: String },

    #[error("No configuration found")]
    #[diagnostic(
        code(xfermon::no_config),
        help(
            "Create a profile in {path}\n\
             or pass --endpoint and --access-token directly."
        )
    )]
    NoConfig { path: String },

    #[error("No endpoints to monitor for profile '{profile}'")]
    #[diagnostic(
        code(xfermon::no_endpoints),
        help("Add `endpoints = [{{ id = \"...\" }}]` to the profile or pass --endpoint.")
    )]
    NoEndpoints { profile: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(xfermon::validation))]
    Validation { field: String, reason: String },

    #[error("Failed to load configuration: {message}")]
    #[diagnostic(code(xfermon::config))]
    ConfigLoad { message: String },

    #[error("Keyring error: {message}")]
    #[diagnostic(
        code(xfermon::keyring),
        help("Use access_token_env or XFERMON_ACCESS_TOKEN where no system keyring is available.")
    )]
    Keyring { message: String },

    // ── Service ──────────────────────────────────────────────────────
    #[error("API error ({code}): {message}")]
    #[diagnostic(code(xfermon::api_error))]
    ApiError { code: String, message: String },

    #[error("Not found: {message}")]
    #[diagnostic(code(xfermon::not_found), help("Check the endpoint ids in your profile."))]
    NotFound { message: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(xfermon::timeout),
        help("Increase the timeout with --timeout or the profile's timeout.")
    )]
    Timeout { seconds: u64 },

    #[error("Cycle incomplete for {count} endpoint(s): {endpoints}")]
    #[diagnostic(
        code(xfermon::incomplete),
        help("The task listing ended early; results cover only the tasks seen.")
    )]
    CycleIncomplete { count: usize, endpoints: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render TOML: {0}")]
    Toml(#[from] toml::ser::Error),

    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::RateLimited { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } | Self::Keyring { .. } => {
                exit_code::AUTH
            }
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::CycleIncomplete { .. } => exit_code::INCOMPLETE,
            Self::Validation { .. }
            | Self::ProfileNotFound { .. }
            | Self::NoConfig { .. }
            | Self::NoEndpoints { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError ───────────────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::NoEndpoints { profile } => Self::NoEndpoints { profile },
            ConfigError::Figment(e) => Self::ConfigLoad {
                message: e.to_string(),
            },
        }
    }
}

// ── CoreError → CliError ─────────────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::AuthenticationFailed { message } => Self::AuthFailed { message },
            CoreError::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },
            CoreError::RateLimited { retry_after_secs } => Self::RateLimited { retry_after_secs },
            CoreError::Api {
                message,
                code,
                status,
            } => {
                if status == Some(404) {
                    Self::NotFound { message }
                } else {
                    Self::ApiError {
                        code: code.unwrap_or_else(|| {
                            status.map_or_else(|| "unknown".into(), |s| format!("HTTP {s}"))
                        }),
                        message,
                    }
                }
            }
            CoreError::MalformedTask { task_id, reason } => Self::ApiError {
                code: "malformed_task".into(),
                message: format!("task {task_id}: {reason}"),
            },
            CoreError::Config { message } => Self::ConfigLoad { message },
            CoreError::Internal(message) => Self::ApiError {
                code: "internal".into(),
                message,
            },
        }
    }
}
