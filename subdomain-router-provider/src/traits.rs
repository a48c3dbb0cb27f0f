use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::types::{CreateDnsRecordRequest, DnsRecord, UpdateDnsRecordRequest};

/// Raw API error (internal).
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// Error code, provider specific.
    pub code: Option<String>,
    /// Error message as returned by the provider.
    pub message: String,
}

impl RawApiError {
    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

/// Extra information used when mapping a raw error (internal).
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    /// Record name, for `RecordExists`.
    pub record_name: Option<String>,
    /// Record id, for `RecordNotFound`.
    pub record_id: Option<String>,
    /// Zone, for `DomainNotFound`.
    pub domain: Option<String>,
}

/// Maps raw provider API errors onto [`ProviderError`] (internal).
pub(crate) trait ProviderErrorMapper {
    /// Provider identifier.
    fn provider_name(&self) -> &'static str;

    /// Map a raw API error to the unified error type.
    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError;

    /// Shortcut: parse error.
    fn parse_error(&self, detail: impl ToString) -> ProviderError {
        ProviderError::ParseError {
            provider: self.provider_name().to_string(),
            detail: detail.to_string(),
        }
    }

    /// Shortcut: unknown error (fallback).
    fn unknown_error(&self, raw: RawApiError) -> ProviderError {
        ProviderError::Unknown {
            provider: self.provider_name().to_string(),
            raw_code: raw.code,
            raw_message: raw.message,
        }
    }
}

/// Remote CRUD surface of a DNS provider, scoped to one zone per call.
///
/// Implementations must be cheap to share (`Arc<dyn DnsProvider>`); every
/// method may fail with a [`ProviderError`] and callers decide how to recover.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Provider identifier.
    fn id(&self) -> &'static str;

    /// List every record of the zone, following pagination to the end.
    ///
    /// Records whose type is not modelled by [`crate::DnsRecordType`] are skipped.
    async fn list_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>>;

    /// Create a record and return it as stored by the provider (with its new id).
    async fn create_record(&self, req: &CreateDnsRecordRequest) -> Result<DnsRecord>;

    /// Overwrite the record identified by `record_id`.
    async fn update_record(
        &self,
        record_id: &str,
        req: &UpdateDnsRecordRequest,
    ) -> Result<DnsRecord>;

    /// Delete the record identified by `record_id`.
    async fn delete_record(&self, record_id: &str, zone_id: &str) -> Result<()>;
}
