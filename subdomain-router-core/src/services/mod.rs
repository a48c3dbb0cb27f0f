//! Business logic service layer

mod reconcile_service;
mod self_ip;
mod site_service;

pub use reconcile_service::ReconcileService;
pub use self_ip::{discover_self_ip, parse_self_ip};
pub use site_service::SiteService;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use subdomain_router_provider::{DnsProvider, ProviderError, full_name_to_relative};
use tokio::sync::{Mutex, RwLock};

use crate::state::SiteState;
use crate::traits::RegistryStore;

/// Zone this router manages.
#[derive(Debug, Clone)]
pub struct ZoneSettings {
    /// Provider zone identifier.
    pub zone_id: String,
    /// Apex domain of the zone (`example.com`).
    pub root_domain: String,
    /// Upper bound on any single provider call.
    pub call_timeout: Duration,
}

/// Service context - holds all dependencies
///
/// The binary builds this once and hands clones of the `Arc` to every service.
pub struct ServiceContext {
    pub provider: Arc<dyn DnsProvider>,
    pub registry_store: Arc<dyn RegistryStore>,
    pub state: Arc<RwLock<SiteState>>,
    pub settings: ZoneSettings,
    /// Held across encode and write of a registry save.
    pub(crate) save_lock: Mutex<()>,
}

impl ServiceContext {
    #[must_use]
    pub fn new(
        provider: Arc<dyn DnsProvider>,
        registry_store: Arc<dyn RegistryStore>,
        settings: ZoneSettings,
        self_ip: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            registry_store,
            state: Arc::new(RwLock::new(SiteState::new(self_ip))),
            settings,
            save_lock: Mutex::new(()),
        }
    }

    /// Site name relative to the zone, as the provider expects it.
    pub fn relative_name(&self, name: &str) -> String {
        full_name_to_relative(name, &self.settings.root_domain)
    }

    /// Fully qualified form of a user-supplied site name.
    pub fn qualify(&self, name: &str) -> String {
        let name = name.trim().trim_end_matches('.');
        let root = &self.settings.root_domain;
        let lower = name.to_ascii_lowercase();
        if lower == root.to_ascii_lowercase()
            || lower.ends_with(&format!(".{}", root.to_ascii_lowercase()))
        {
            name.to_string()
        } else {
            format!("{name}.{root}")
        }
    }

    /// Run one provider call under the configured timeout.
    pub(crate) async fn call<T>(
        &self,
        fut: impl Future<Output = subdomain_router_provider::Result<T>>,
    ) -> subdomain_router_provider::Result<T> {
        match tokio::time::timeout(self.settings.call_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout {
                provider: self.provider.id().to_string(),
                detail: format!(
                    "no response within {}s",
                    self.settings.call_timeout.as_secs_f32()
                ),
            }),
        }
    }
}
