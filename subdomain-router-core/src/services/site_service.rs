//! Site management service

use std::sync::Arc;

use indexmap::IndexMap;
use subdomain_router_provider::{CreateDnsRecordRequest, DnsRecordType, UpdateDnsRecordRequest};

use crate::error::{CoreError, CoreResult};
use crate::registry::{DecodedSite, decode_registry, encode_registry};
use crate::resolver::{self, Resolution};
use crate::services::ServiceContext;
use crate::types::{ReconciledRecord, RecordKind, SiteEntry};

/// Registry management: add, delete, list, reload, save and resolve.
///
/// Mutations take the state write lock for their whole duration, provider
/// call included.
pub struct SiteService {
    ctx: Arc<ServiceContext>,
}

impl SiteService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Replace the in-memory registry with the store's contents.
    ///
    /// Used once at startup; a malformed file is fatal there.
    pub async fn load_registry(&self) -> CoreResult<usize> {
        let json = self.ctx.registry_store.load_raw_json().await?;
        let mut state = self.ctx.state.write().await;
        let sites = decode_registry(&json, state.self_ip())?;
        let count = sites.len();
        state.replace_all(sites.into_iter().map(|s| (s.entry, s.record)));
        log::info!("Loaded {count} sites from the registry");
        Ok(count)
    }

    /// Re-read the store and merge it into the live site entries.
    ///
    /// Targets, kinds and proxy flags come from the file; record ids already
    /// known in memory win over the file's. Sites that exist only in memory
    /// are kept, and reconciled records are never touched. On a decode
    /// failure the live registry is left as it was.
    /// Returns the resulting `name -> target` map.
    pub async fn reload_registry(&self) -> CoreResult<IndexMap<String, String>> {
        let json = self.ctx.registry_store.load_raw_json().await?;
        let mut state = self.ctx.state.write().await;
        let sites = decode_registry(&json, state.self_ip())?;

        for DecodedSite { mut entry, .. } in sites {
            if let Some(live) = state.entry(&entry.name)
                && live.provider_record_id.is_some()
            {
                entry.provider_record_id.clone_from(&live.provider_record_id);
            }
            state.upsert_entry(entry);
        }

        let sites = Self::targets(state.entries());
        log::info!("Reloaded registry, {} sites", sites.len());
        Ok(sites)
    }

    /// Encode the live registry and write it to the store.
    ///
    /// Saves are serialized, so the last one to start is the last written.
    pub async fn save_registry(&self) -> CoreResult<()> {
        let _guard = self.ctx.save_lock.lock().await;
        let json = {
            let state = self.ctx.state.read().await;
            encode_registry(&state)?
        };
        self.ctx.registry_store.save_raw_json(&json).await?;
        log::info!("Registry saved");
        Ok(())
    }

    /// Register `name` as a redirect to `target` and point its A-record here.
    ///
    /// `name` may be given with or without the root domain. A name that
    /// already has a record id is updated in place instead of created again.
    /// The entry stays registered even if the provider call fails.
    pub async fn add_record(&self, name: &str, target: &str) -> CoreResult<ReconciledRecord> {
        if name.trim().is_empty() {
            return Err(CoreError::MissingParameter("name"));
        }
        if target.trim().is_empty() {
            return Err(CoreError::MissingParameter("target"));
        }

        let name = self.ctx.qualify(name);
        let relative = self.ctx.relative_name(&name);

        let mut state = self.ctx.state.write().await;
        let self_ip = state.self_ip().to_string();
        let known_id = state
            .record(&name)
            .and_then(|r| r.provider_record_id.clone())
            .or_else(|| state.entry(&name).and_then(|e| e.provider_record_id.clone()));

        let mut entry = SiteEntry::new(name.clone(), target.trim(), RecordKind::Url);
        entry.provider_record_id.clone_from(&known_id);
        state.upsert_entry(entry);
        log::info!("Adding DNS record: A {name} -> {self_ip}");

        let result = match known_id.as_deref() {
            Some(id) => {
                let req = UpdateDnsRecordRequest {
                    zone_id: self.ctx.settings.zone_id.clone(),
                    name: relative,
                    record_type: DnsRecordType::A,
                    content: self_ip.clone(),
                    proxied: true,
                };
                self.ctx
                    .call(self.ctx.provider.update_record(id, &req))
                    .await
            }
            None => {
                let req = CreateDnsRecordRequest {
                    zone_id: self.ctx.settings.zone_id.clone(),
                    name: relative,
                    record_type: DnsRecordType::A,
                    content: self_ip.clone(),
                    proxied: true,
                };
                self.ctx.call(self.ctx.provider.create_record(&req)).await
            }
        };

        match result {
            Ok(created) => {
                let record = ReconciledRecord::desired(self_ip, Some(created.id), true);
                state.set_record(&name, record.clone());
                Ok(record)
            }
            Err(e) => {
                state.set_record(&name, ReconciledRecord::desired(self_ip, known_id, true));
                Err(CoreError::ProviderCallFailed(e))
            }
        }
    }

    /// Delete the provider record behind `name` and forget the site.
    ///
    /// `name` may be given with or without the root domain. A site that never
    /// got a record id is only removed locally. If the provider rejects the
    /// delete, local state is left as it was.
    pub async fn delete_record(&self, name: &str) -> CoreResult<SiteEntry> {
        if name.trim().is_empty() {
            return Err(CoreError::MissingParameter("name"));
        }

        let mut state = self.ctx.state.write().await;
        let key = [name.trim().to_string(), self.ctx.qualify(name)]
            .into_iter()
            .find(|candidate| state.entry(candidate).is_some())
            .ok_or_else(|| CoreError::SubdomainNotFound(name.to_string()))?;

        let id = state
            .record(&key)
            .and_then(|r| r.provider_record_id.clone())
            .or_else(|| state.entry(&key).and_then(|e| e.provider_record_id.clone()));

        match id {
            Some(id) => {
                log::info!("Deleting DNS record: {key} ({id})");
                self.ctx
                    .call(
                        self.ctx
                            .provider
                            .delete_record(&id, &self.ctx.settings.zone_id),
                    )
                    .await
                    .map_err(CoreError::ProviderCallFailed)?;
            }
            None => log::warn!("[{key}] has no record id, removing locally only"),
        }

        state
            .remove(&key)
            .ok_or_else(|| CoreError::SubdomainNotFound(key))
    }

    /// Snapshot of every reconciled record.
    pub async fn list_records(&self) -> IndexMap<String, ReconciledRecord> {
        self.ctx.state.read().await.records().clone()
    }

    /// Snapshot of every registered site.
    pub async fn list_sites(&self) -> Vec<SiteEntry> {
        self.ctx.state.read().await.entries().values().cloned().collect()
    }

    /// Resolve a visit to `host` at `path`.
    pub async fn resolve(&self, host: &str, path: &str) -> CoreResult<Resolution> {
        let state = self.ctx.state.read().await;
        resolver::resolve(&state, &self.ctx.settings.root_domain, host, path)
    }

    fn targets(entries: &IndexMap<String, SiteEntry>) -> IndexMap<String, String> {
        entries
            .iter()
            .map(|(name, entry)| (name.clone(), entry.target.clone()))
            .collect()
    }
}
