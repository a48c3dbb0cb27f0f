//! Startup reconciliation between the registry and the provider

use std::collections::BTreeMap;
use std::sync::Arc;

use subdomain_router_provider::{
    CreateDnsRecordRequest, DnsRecord, DnsRecordType, ProviderError, UpdateDnsRecordRequest,
};

use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;
use crate::state::SiteState;
use crate::types::{ReconcileOutcome, ReconcileReport, ReconciledRecord, RemoteRecord, SiteEntry};

/// Remote records grouped by lowercase relative name.
struct RemoteIndex(BTreeMap<String, Vec<RemoteRecord>>);

impl RemoteIndex {
    fn new(records: Vec<DnsRecord>) -> Self {
        let mut index: BTreeMap<String, Vec<RemoteRecord>> = BTreeMap::new();
        for record in records {
            index
                .entry(record.name.to_ascii_lowercase())
                .or_default()
                .push(RemoteRecord::from(record));
        }
        Self(index)
    }

    /// Remote record for `relative`, preferring the one whose id is `local_id`.
    ///
    /// With a local id, only the record carrying that id counts as a match.
    fn lookup(&self, relative: &str, local_id: Option<&str>) -> Option<&RemoteRecord> {
        let candidates = self.0.get(&relative.to_ascii_lowercase())?;
        match local_id {
            Some(id) => candidates.iter().find(|r| r.provider_record_id == id),
            None => candidates.first(),
        }
    }
}

/// Drives the local registry and the provider's records into agreement.
pub struct ReconcileService {
    ctx: Arc<ServiceContext>,
}

impl ReconcileService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// One full pass over every registered site.
    ///
    /// A failed zone listing aborts the pass before any mutation. Individual
    /// site failures are logged, recorded in the report, and never stop the
    /// pass.
    pub async fn reconcile(&self) -> CoreResult<ReconcileReport> {
        let mut state = self.ctx.state.write().await;

        let remote = self
            .ctx
            .call(self.ctx.provider.list_records(&self.ctx.settings.zone_id))
            .await
            .map_err(CoreError::ProviderListFailed)?;
        log::info!("Reconciling against {} remote records", remote.len());
        let remote = RemoteIndex::new(remote);

        let names: Vec<String> = state.entries().keys().cloned().collect();
        let mut report = ReconcileReport::default();
        for name in names {
            let Some(entry) = state.entry(&name).cloned() else {
                continue;
            };
            let outcome = self.reconcile_site(&mut state, &entry, &remote).await;
            match &outcome {
                ReconcileOutcome::Failed { reason } => {
                    log::error!("[{name}] reconciliation failed: {reason}");
                }
                ReconcileOutcome::FellBackToRemote { content } => {
                    log::warn!("[{name}] provider kept its record, now pointing at {content}");
                }
                other => log::info!("[{name}] {other:?}"),
            }
            report.outcomes.insert(name, outcome);
        }

        Ok(report)
    }

    async fn reconcile_site(
        &self,
        state: &mut SiteState,
        entry: &SiteEntry,
        remote: &RemoteIndex,
    ) -> ReconcileOutcome {
        let desired = entry.desired_content(state.self_ip());
        let relative = self.ctx.relative_name(&entry.name);

        let Some(local_id) = entry.provider_record_id.as_deref() else {
            return match remote.lookup(&relative, None) {
                Some(existing) => {
                    log::warn!(
                        "[{}] unregistered remote record {} already holds {}",
                        entry.name,
                        existing.provider_record_id,
                        existing.content
                    );
                    match self.create(state, entry, &relative, &desired).await {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            log::warn!("[{}] create rejected: {e}", entry.name);
                            state.adopt_remote(&entry.name, existing);
                            ReconcileOutcome::FellBackToRemote {
                                content: existing.content.clone(),
                            }
                        }
                    }
                }
                None => self
                    .create(state, entry, &relative, &desired)
                    .await
                    .unwrap_or_else(|e| ReconcileOutcome::Failed {
                        reason: e.to_string(),
                    }),
            };
        };

        match remote.lookup(&relative, Some(local_id)) {
            None => {
                log::warn!(
                    "[{}] record {local_id} is gone at the provider, re-creating",
                    entry.name
                );
                self.create(state, entry, &relative, &desired)
                    .await
                    .unwrap_or_else(|e| ReconcileOutcome::Failed {
                        reason: e.to_string(),
                    })
            }
            Some(existing) if existing.content == desired => {
                state.set_record(
                    &entry.name,
                    ReconciledRecord {
                        content: existing.content.clone(),
                        provider_record_id: Some(local_id.to_string()),
                        provider_type: existing.provider_type,
                        proxied: entry.proxied,
                    },
                );
                ReconcileOutcome::Unchanged
            }
            Some(existing) => {
                log::info!(
                    "[{}] remote holds {}, want {desired}",
                    entry.name,
                    existing.content
                );
                let req = UpdateDnsRecordRequest {
                    zone_id: self.ctx.settings.zone_id.clone(),
                    name: relative.clone(),
                    record_type: DnsRecordType::A,
                    content: desired.clone(),
                    proxied: entry.proxied,
                };
                match self
                    .ctx
                    .call(self.ctx.provider.update_record(local_id, &req))
                    .await
                {
                    Ok(_) => {
                        state.set_record(
                            &entry.name,
                            ReconciledRecord::desired(
                                desired,
                                Some(local_id.to_string()),
                                entry.proxied,
                            ),
                        );
                        ReconcileOutcome::Updated
                    }
                    Err(e) => {
                        log::warn!("[{}] update rejected: {e}", entry.name);
                        state.adopt_remote(&entry.name, existing);
                        ReconcileOutcome::FellBackToRemote {
                            content: existing.content.clone(),
                        }
                    }
                }
            }
        }
    }

    /// Create the desired record and store it on success.
    async fn create(
        &self,
        state: &mut SiteState,
        entry: &SiteEntry,
        relative: &str,
        desired: &str,
    ) -> Result<ReconcileOutcome, ProviderError> {
        let req = CreateDnsRecordRequest {
            zone_id: self.ctx.settings.zone_id.clone(),
            name: relative.to_string(),
            record_type: DnsRecordType::A,
            content: desired.to_string(),
            proxied: entry.proxied,
        };
        let created = self
            .ctx
            .call(self.ctx.provider.create_record(&req))
            .await?;

        state.set_record(
            &entry.name,
            ReconciledRecord::desired(desired, Some(created.id.clone()), entry.proxied),
        );
        Ok(ReconcileOutcome::Created {
            record_id: created.id,
        })
    }
}
