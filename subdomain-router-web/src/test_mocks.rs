use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use async_trait::async_trait;
use subdomain_router_core::adapters::JsonFileRegistryStore;
use subdomain_router_core::{ServiceContext, SiteService, ZoneSettings};
use subdomain_router_provider::{
    CreateDnsRecordRequest, DnsProvider, DnsRecord, ProviderError, UpdateDnsRecordRequest,
};
use tempfile::TempDir;
use tokio::sync::Mutex;

use super::AppState;
use crate::config::MatrixConfig;

pub const SELF_IP: &str = "203.0.113.1";
pub const ROOT: &str = "example.com";

/// Provider that accepts everything and hands out sequential ids.
#[derive(Default)]
pub struct MockDnsProvider {
    pub records: Mutex<Vec<DnsRecord>>,
    pub fail_mutations: Mutex<bool>,
}

impl MockDnsProvider {
    fn refused() -> ProviderError {
        ProviderError::PermissionDenied {
            provider: "mock".to_string(),
            raw_message: Some("token is read-only".to_string()),
        }
    }
}

#[async_trait]
impl DnsProvider for MockDnsProvider {
    fn id(&self) -> &'static str {
        "mock"
    }

    async fn list_records(&self, _zone_id: &str) -> subdomain_router_provider::Result<Vec<DnsRecord>> {
        Ok(self.records.lock().await.clone())
    }

    async fn create_record(
        &self,
        req: &CreateDnsRecordRequest,
    ) -> subdomain_router_provider::Result<DnsRecord> {
        if *self.fail_mutations.lock().await {
            return Err(Self::refused());
        }
        let mut records = self.records.lock().await;
        let record = DnsRecord {
            id: format!("rec-{}", records.len() + 1),
            zone_id: req.zone_id.clone(),
            name: req.name.clone(),
            record_type: req.record_type,
            content: req.content.clone(),
            ttl: 1,
            proxied: Some(req.proxied),
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn update_record(
        &self,
        record_id: &str,
        req: &UpdateDnsRecordRequest,
    ) -> subdomain_router_provider::Result<DnsRecord> {
        if *self.fail_mutations.lock().await {
            return Err(Self::refused());
        }
        let mut records = self.records.lock().await;
        let record = records
            .iter_mut()
            .find(|r| r.id == record_id)
            .ok_or_else(|| ProviderError::RecordNotFound {
                provider: "mock".to_string(),
                record_id: record_id.to_string(),
                raw_message: None,
            })?;
        record.content.clone_from(&req.content);
        Ok(record.clone())
    }

    async fn delete_record(
        &self,
        record_id: &str,
        _zone_id: &str,
    ) -> subdomain_router_provider::Result<()> {
        if *self.fail_mutations.lock().await {
            return Err(Self::refused());
        }
        self.records.lock().await.retain(|r| r.id != record_id);
        Ok(())
    }
}

pub struct TestApp {
    pub state: web::Data<AppState>,
    pub provider: Arc<MockDnsProvider>,
    pub dir: TempDir,
}

impl TestApp {
    pub fn registry_path(&self) -> std::path::PathBuf {
        self.dir.path().join("sites.json")
    }
}

/// App state over a mock provider and a registry file seeded with `registry`.
pub async fn test_app(registry: &str, matrix: bool) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sites.json");
    std::fs::write(&path, registry).unwrap();

    let provider = Arc::new(MockDnsProvider::default());
    let ctx = Arc::new(ServiceContext::new(
        provider.clone(),
        Arc::new(JsonFileRegistryStore::new(path)),
        ZoneSettings {
            zone_id: "zone-1".to_string(),
            root_domain: ROOT.to_string(),
            call_timeout: Duration::from_secs(5),
        },
        SELF_IP,
    ));
    let sites = Arc::new(SiteService::new(ctx));
    sites.load_registry().await.unwrap();

    let state = web::Data::new(AppState {
        sites,
        root_domain: ROOT.to_string(),
        matrix: matrix.then(|| MatrixConfig {
            server: "matrix.example.com:443".to_string(),
            homeserver_base_url: "https://matrix.example.com".to_string(),
        }),
    });

    TestApp {
        state,
        provider,
        dir,
    }
}
