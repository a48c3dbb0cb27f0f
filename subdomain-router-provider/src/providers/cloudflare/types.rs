//! Cloudflare API payloads

use serde::{Deserialize, Serialize};

/// Envelope of every Cloudflare v4 response.
#[derive(Debug, Deserialize)]
pub struct CloudflareResponse<T> {
    pub success: bool,
    pub result: Option<T>,
    pub errors: Option<Vec<CloudflareError>>,
    pub result_info: Option<CloudflareResultInfo>,
}

#[derive(Debug, Deserialize)]
pub struct CloudflareError {
    pub code: i32,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct CloudflareResultInfo {
    pub page: u32,
    pub total_pages: Option<u32>,
    pub total_count: u32,
}

/// Zone, only the fields needed for name translation.
#[derive(Debug, Deserialize)]
pub struct CloudflareZone {
    pub id: String,
    pub name: String,
}

/// DNS record as returned by the API.
#[derive(Debug, Deserialize)]
pub struct CloudflareDnsRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub content: String,
    pub ttl: u32,
    #[serde(default)]
    pub proxied: Option<bool>,
}

/// Body of create (POST) and update (PATCH) requests.
#[derive(Debug, Serialize)]
pub struct CloudflareRecordBody<'a> {
    #[serde(rename = "type")]
    pub record_type: &'a str,
    pub name: String,
    pub content: &'a str,
    pub ttl: u32,
    pub proxied: bool,
}
