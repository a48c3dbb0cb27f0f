//! Test helpers: in-memory provider and registry store.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use subdomain_router_provider::{
    CreateDnsRecordRequest, DnsProvider, DnsRecord, DnsRecordType, ProviderError, Result,
    UpdateDnsRecordRequest,
};
use tokio::sync::RwLock;

use crate::error::CoreResult;
use crate::services::{ServiceContext, SiteService, ZoneSettings};
use crate::traits::RegistryStore;

pub const SELF_IP: &str = "203.0.113.1";
pub const ROOT_DOMAIN: &str = "example.com";
pub const ZONE_ID: &str = "zone-1";

// ===== MockDnsProvider =====

/// In-memory zone with scripted failures.
#[derive(Default)]
pub struct MockDnsProvider {
    records: RwLock<Vec<DnsRecord>>,
    queued_ids: RwLock<VecDeque<String>>,
    issued: RwLock<usize>,
    fail_list: RwLock<bool>,
    fail_delete: RwLock<bool>,
    fail_create_names: RwLock<HashSet<String>>,
    fail_update_ids: RwLock<HashSet<String>>,
    /// Mutating calls in order (`create:blog`, `update:r1`, `delete:r1`).
    calls: RwLock<Vec<String>>,
    delay: RwLock<Option<Duration>>,
    create_delays: RwLock<HashMap<String, Duration>>,
    update_delays: RwLock<HashMap<String, Duration>>,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a record into the zone without counting it as a call.
    pub async fn seed(&self, id: &str, name: &str, record_type: DnsRecordType, content: &str) {
        self.records.write().await.push(DnsRecord {
            id: id.to_string(),
            zone_id: ZONE_ID.to_string(),
            name: name.to_string(),
            record_type,
            content: content.to_string(),
            ttl: 1,
            proxied: Some(true),
        });
    }

    /// Id handed out by the next successful create.
    pub async fn queue_id(&self, id: &str) {
        self.queued_ids.write().await.push_back(id.to_string());
    }

    pub async fn fail_list(&self) {
        *self.fail_list.write().await = true;
    }

    pub async fn fail_delete(&self) {
        *self.fail_delete.write().await = true;
    }

    pub async fn fail_create_for(&self, relative_name: &str) {
        self.fail_create_names
            .write()
            .await
            .insert(relative_name.to_string());
    }

    pub async fn fail_update_for(&self, record_id: &str) {
        self.fail_update_ids
            .write()
            .await
            .insert(record_id.to_string());
    }

    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// Stall creates of `relative_name` only.
    pub async fn delay_create_for(&self, relative_name: &str, delay: Duration) {
        self.create_delays
            .write()
            .await
            .insert(relative_name.to_string(), delay);
    }

    /// Stall updates of `record_id` only.
    pub async fn delay_update_for(&self, record_id: &str, delay: Duration) {
        self.update_delays
            .write()
            .await
            .insert(record_id.to_string(), delay);
    }

    pub async fn records(&self) -> Vec<DnsRecord> {
        self.records.read().await.clone()
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }

    pub async fn mutation_count(&self) -> usize {
        self.calls.read().await.len()
    }

    async fn pause(&self) {
        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    async fn next_id(&self) -> String {
        if let Some(id) = self.queued_ids.write().await.pop_front() {
            return id;
        }
        let mut issued = self.issued.write().await;
        *issued += 1;
        format!("rec-{issued}")
    }

    fn rejected(detail: &str) -> ProviderError {
        ProviderError::InvalidParameter {
            provider: "mock".to_string(),
            param: "content".to_string(),
            detail: detail.to_string(),
        }
    }
}

#[async_trait]
impl DnsProvider for MockDnsProvider {
    fn id(&self) -> &'static str {
        "mock"
    }

    async fn list_records(&self, _zone_id: &str) -> Result<Vec<DnsRecord>> {
        self.pause().await;
        if *self.fail_list.read().await {
            return Err(ProviderError::NetworkError {
                provider: "mock".to_string(),
                detail: "connection refused".to_string(),
            });
        }
        Ok(self.records.read().await.clone())
    }

    async fn create_record(&self, req: &CreateDnsRecordRequest) -> Result<DnsRecord> {
        self.pause().await;
        let delay = self.create_delays.read().await.get(&req.name).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.calls.write().await.push(format!("create:{}", req.name));
        if self.fail_create_names.read().await.contains(&req.name) {
            return Err(ProviderError::RecordExists {
                provider: "mock".to_string(),
                record_name: req.name.clone(),
                raw_message: None,
            });
        }

        let record = DnsRecord {
            id: self.next_id().await,
            zone_id: req.zone_id.clone(),
            name: req.name.clone(),
            record_type: req.record_type,
            content: req.content.clone(),
            ttl: 1,
            proxied: Some(req.proxied),
        };
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn update_record(
        &self,
        record_id: &str,
        req: &UpdateDnsRecordRequest,
    ) -> Result<DnsRecord> {
        self.pause().await;
        let delay = self.update_delays.read().await.get(record_id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.calls.write().await.push(format!("update:{record_id}"));
        if self.fail_update_ids.read().await.contains(record_id) {
            return Err(Self::rejected("record is locked"));
        }

        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id == record_id)
            .ok_or_else(|| ProviderError::RecordNotFound {
                provider: "mock".to_string(),
                record_id: record_id.to_string(),
                raw_message: None,
            })?;
        record.name.clone_from(&req.name);
        record.record_type = req.record_type;
        record.content.clone_from(&req.content);
        record.proxied = Some(req.proxied);
        Ok(record.clone())
    }

    async fn delete_record(&self, record_id: &str, _zone_id: &str) -> Result<()> {
        self.pause().await;
        self.calls.write().await.push(format!("delete:{record_id}"));
        if *self.fail_delete.read().await {
            return Err(Self::rejected("delete refused"));
        }
        self.records.write().await.retain(|r| r.id != record_id);
        Ok(())
    }
}

// ===== MemoryRegistryStore =====

pub struct MemoryRegistryStore {
    json: RwLock<String>,
}

impl MemoryRegistryStore {
    pub fn new(json: &str) -> Self {
        Self {
            json: RwLock::new(json.to_string()),
        }
    }

    pub async fn contents(&self) -> String {
        self.json.read().await.clone()
    }

    pub async fn set_contents(&self, json: &str) {
        *self.json.write().await = json.to_string();
    }
}

#[async_trait]
impl RegistryStore for MemoryRegistryStore {
    async fn load_raw_json(&self) -> CoreResult<String> {
        Ok(self.json.read().await.clone())
    }

    async fn save_raw_json(&self, json: &str) -> CoreResult<()> {
        *self.json.write().await = json.to_string();
        Ok(())
    }
}

// ===== Harness =====

pub struct TestHarness {
    pub ctx: Arc<ServiceContext>,
    pub provider: Arc<MockDnsProvider>,
    pub store: Arc<MemoryRegistryStore>,
}

impl TestHarness {
    /// Context over a mock zone, with `json` already loaded as the registry.
    pub async fn with_registry(json: &str) -> Self {
        let provider = Arc::new(MockDnsProvider::new());
        let store = Arc::new(MemoryRegistryStore::new(json));
        let ctx = Arc::new(ServiceContext::new(
            provider.clone(),
            store.clone(),
            ZoneSettings {
                zone_id: ZONE_ID.to_string(),
                root_domain: ROOT_DOMAIN.to_string(),
                call_timeout: Duration::from_millis(200),
            },
            SELF_IP,
        ));
        SiteService::new(ctx.clone()).load_registry().await.unwrap();
        Self {
            ctx,
            provider,
            store,
        }
    }
}
