// ── Core error types ──
//
// Monitor-facing errors from xfermon-core. Consumers never see HTTP status
// codes or JSON parse failures directly. The `From<xfermon_api::Error>`
// impl translates transport-layer errors into monitor-level variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach transfer service at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Transfer service request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Rate limited by transfer service -- retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    /// A task record that could not be decoded or classified. The record
    /// is skipped; the rest of the listing is still processed.
    #[error("Malformed task record {task_id}: {reason}")]
    MalformedTask {
        /// The record's `task_id`, or `<unknown>` when it has none.
        task_id: String,
        reason: String,
    },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// The service-specific error code (e.g. "ClientError.NotFound").
        code: Option<String>,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Record-level failures skip one task; everything else ends the
    /// current listing.
    pub fn is_malformed_record(&self) -> bool {
        matches!(self, Self::MalformedTask { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<xfermon_api::Error> for CoreError {
    fn from(err: xfermon_api::Error) -> Self {
        match err {
            xfermon_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            xfermon_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            xfermon_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            xfermon_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            xfermon_api::Error::RateLimited { retry_after_secs } => {
                CoreError::RateLimited { retry_after_secs }
            }
            xfermon_api::Error::Api {
                status,
                code,
                message,
                request_id,
            } => CoreError::Api {
                message: match request_id {
                    Some(id) => format!("{message} (request {id})"),
                    None => message,
                },
                code,
                status: Some(status),
            },
            xfermon_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
