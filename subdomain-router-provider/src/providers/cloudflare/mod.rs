//! Cloudflare DNS Provider

mod error;
mod http;
mod provider;
mod types;

use std::collections::HashMap;

use reqwest::Client;
use tokio::sync::RwLock;

use crate::providers::common::create_http_client;

pub(crate) use types::{CloudflareDnsRecord, CloudflareResponse, CloudflareZone};

pub(crate) const CF_API_BASE: &str = "https://api.cloudflare.com/client/v4";
/// Maximum page size of the DNS Records API.
pub(crate) const MAX_PAGE_SIZE_RECORDS: u32 = 100;
/// Retries for idempotent reads. Mutations are never retried.
pub(crate) const READ_RETRIES: u32 = 3;
/// `ttl = 1` means "automatic" on Cloudflare.
pub(crate) const AUTO_TTL: u32 = 1;

/// Cloudflare DNS Provider
pub struct CloudflareProvider {
    pub(crate) client: Client,
    pub(crate) api_token: String,
    /// zone id -> zone name; zone names never change for a given id.
    pub(crate) zone_names: RwLock<HashMap<String, String>>,
}

impl CloudflareProvider {
    pub fn new(api_token: String) -> Self {
        Self {
            client: create_http_client(),
            api_token,
            zone_names: RwLock::new(HashMap::new()),
        }
    }
}
