use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use subdomain_router_provider::{DnsRecord, DnsRecordType};

/// Local belief about the provider record backing a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledRecord {
    pub content: String,
    pub provider_record_id: Option<String>,
    pub provider_type: DnsRecordType,
    pub proxied: bool,
}

impl ReconciledRecord {
    /// An `A` record this server wants to exist.
    pub fn desired(content: impl Into<String>, id: Option<String>, proxied: bool) -> Self {
        Self {
            content: content.into(),
            provider_record_id: id,
            provider_type: DnsRecordType::A,
            proxied,
        }
    }
}

/// A record as listed by the provider, keyed by its relative name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRecord {
    pub name: String,
    pub content: String,
    pub provider_record_id: String,
    pub provider_type: DnsRecordType,
}

impl From<DnsRecord> for RemoteRecord {
    fn from(record: DnsRecord) -> Self {
        Self {
            name: record.name,
            content: record.content,
            provider_record_id: record.id,
            provider_type: record.record_type,
        }
    }
}

/// Which branch a site took during a reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum ReconcileOutcome {
    /// A record was created (or re-created after going stale remotely).
    Created { record_id: String },
    /// The existing record was updated to the desired content.
    Updated,
    /// Local and remote already agreed.
    Unchanged,
    /// The provider refused our version; the local entry now mirrors the remote record.
    FellBackToRemote { content: String },
    /// No remote record exists and creating one failed.
    Failed { reason: String },
}

/// Per-site outcomes of one reconciliation pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileReport {
    pub outcomes: BTreeMap<String, ReconcileOutcome>,
}

impl ReconcileReport {
    pub fn get(&self, name: &str) -> Option<&ReconcileOutcome> {
        self.outcomes.get(name)
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .values()
            .filter(|o| matches!(o, ReconcileOutcome::Failed { .. }))
            .count()
    }

    /// Whether the pass touched the provider or rewrote local state.
    pub fn changed_anything(&self) -> bool {
        self.outcomes
            .values()
            .any(|o| !matches!(o, ReconcileOutcome::Unchanged))
    }
}
