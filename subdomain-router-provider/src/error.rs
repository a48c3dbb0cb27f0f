use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for all DNS provider operations.
///
/// Each variant carries the `provider` that produced it plus variant-specific
/// context. Variants are serializable so the management API can echo them.
///
/// # Retryable Errors
///
/// - [`NetworkError`](Self::NetworkError): network connectivity issues
/// - [`Timeout`](Self::Timeout): request timed out
/// - [`RateLimited`](Self::RateLimited): API rate limit exceeded
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum ProviderError {
    /// A network-level error occurred (connection refused, TLS failure, 5xx gateway).
    #[error("[{provider}] Network error: {detail}")]
    NetworkError { provider: String, detail: String },

    /// The API token is invalid or expired.
    #[error("[{provider}] Invalid credentials{}", fmt_raw(.raw_message))]
    InvalidCredentials {
        provider: String,
        raw_message: Option<String>,
    },

    /// A record with the same name already exists (duplicate-name constraint).
    #[error("[{provider}] Record '{record_name}' already exists")]
    RecordExists {
        provider: String,
        record_name: String,
        raw_message: Option<String>,
    },

    /// The record id is unknown to the provider.
    #[error("[{provider}] Record '{record_id}' not found")]
    RecordNotFound {
        provider: String,
        record_id: String,
        raw_message: Option<String>,
    },

    /// A request parameter was rejected (malformed IPv4 content, bad name, ...).
    #[error("[{provider}] Invalid parameter '{param}': {detail}")]
    InvalidParameter {
        provider: String,
        param: String,
        detail: String,
    },

    /// The record type is not modelled by this library.
    #[error("[{provider}] Unsupported record type: {record_type}")]
    UnsupportedRecordType {
        provider: String,
        record_type: String,
    },

    /// The zone's record quota has been exceeded.
    #[error("[{provider}] Quota exceeded")]
    QuotaExceeded {
        provider: String,
        raw_message: Option<String>,
    },

    /// HTTP 429 or equivalent. Transient.
    #[error("[{provider}] Rate limited{}", fmt_retry_after(.retry_after))]
    RateLimited {
        provider: String,
        retry_after: Option<u64>,
        raw_message: Option<String>,
    },

    /// The request did not complete in time. Transient.
    #[error("[{provider}] Request timeout: {detail}")]
    Timeout { provider: String, detail: String },

    /// The zone does not exist or is not visible to the token.
    #[error("[{provider}] Domain '{domain}' not found{}", fmt_raw(.raw_message))]
    DomainNotFound {
        provider: String,
        domain: String,
        raw_message: Option<String>,
    },

    /// The token lacks permission for the operation.
    #[error("[{provider}] Permission denied{}", fmt_raw(.raw_message))]
    PermissionDenied {
        provider: String,
        raw_message: Option<String>,
    },

    /// The provider's response could not be parsed.
    #[error("[{provider}] Parse error: {detail}")]
    ParseError { provider: String, detail: String },

    /// Catch-all for error codes not mapped to a specific variant.
    #[error("[{provider}] {raw_message}")]
    Unknown {
        provider: String,
        raw_code: Option<String>,
        raw_message: String,
    },
}

fn fmt_raw(raw_message: &Option<String>) -> String {
    raw_message
        .as_ref()
        .map(|msg| format!(": {msg}"))
        .unwrap_or_default()
}

fn fmt_retry_after(retry_after: &Option<u64>) -> String {
    retry_after
        .map(|secs| format!(" (retry after {secs}s)"))
        .unwrap_or_default()
}

impl ProviderError {
    /// Whether this is expected behavior (bad input, missing resource, ...),
    /// used to pick the log level.
    ///
    /// `true` should be logged at `warn`, `false` at `error`.
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials { .. }
                | Self::RecordExists { .. }
                | Self::RecordNotFound { .. }
                | Self::InvalidParameter { .. }
                | Self::UnsupportedRecordType { .. }
                | Self::QuotaExceeded { .. }
                | Self::DomainNotFound { .. }
                | Self::PermissionDenied { .. }
        )
    }

    /// Level to log this error at, per [`Self::is_expected`].
    #[must_use]
    pub fn log_level(&self) -> log::Level {
        if self.is_expected() {
            log::Level::Warn
        } else {
            log::Level::Error
        }
    }

    /// Whether a retry of the same request may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::NetworkError { .. } | Self::Timeout { .. } | Self::RateLimited { .. }
        )
    }
}

/// Convenience type alias for `Result<T, ProviderError>`.
pub type Result<T> = std::result::Result<T, ProviderError>;
