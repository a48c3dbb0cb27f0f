//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

pub use subdomain_router_provider::ProviderError;

/// Core layer error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// A create/update/delete call was rejected or timed out.
    #[error("Provider call failed: {0}")]
    ProviderCallFailed(ProviderError),

    /// Listing the zone failed; a reconciliation pass cannot proceed.
    #[error("Provider listing failed: {0}")]
    ProviderListFailed(ProviderError),

    /// The durable registry file is malformed.
    #[error("Registry decode failed: {0}")]
    RegistryDecodeFailed(String),

    /// No site matches the requested subdomain.
    #[error("Subdomain not found: {0}")]
    SubdomainNotFound(String),

    /// A required request parameter is missing or empty.
    #[error("Missing '{0}' parameter")]
    MissingParameter(&'static str),

    /// Reading or writing the registry store failed.
    #[error("Storage error: {0}")]
    StorageError(String),

    /// The public IP of this server could not be discovered.
    #[error("Self IP lookup failed: {0}")]
    SelfIpLookupFailed(String),
}

impl CoreError {
    /// Whether it is expected behavior (user input, unknown subdomain, ...);
    /// used to pick the log level.
    ///
    /// `true` should be logged at `warn`, `false` at `error`.
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::SubdomainNotFound(_) | Self::MissingParameter(_) => true,
            Self::ProviderCallFailed(e) => e.is_expected(),
            _ => false,
        }
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
