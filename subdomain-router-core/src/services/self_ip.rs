//! Public IP discovery.

use std::net::Ipv4Addr;
use std::sync::LazyLock;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{CoreError, CoreResult};

/// Shared HTTP client for IP lookups.
static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap_or_default()
});

/// `ipinfo.io`-style response; only the address is used.
#[derive(Deserialize)]
struct IpInfoResponse {
    ip: String,
}

/// Ask `lookup_url` for this server's public IPv4 address.
///
/// `URL` sites point their A-record at this address.
pub async fn discover_self_ip(lookup_url: &str) -> CoreResult<Ipv4Addr> {
    let body = HTTP_CLIENT
        .get(lookup_url)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|e| CoreError::SelfIpLookupFailed(format!("Request failed: {e}")))?
        .text()
        .await
        .map_err(|e| CoreError::SelfIpLookupFailed(format!("Failed to read response: {e}")))?;

    let ip = parse_self_ip(&body)?;
    log::info!("Public IP is {ip}");
    Ok(ip)
}

/// Extract the IPv4 address from a lookup response body.
pub fn parse_self_ip(body: &str) -> CoreResult<Ipv4Addr> {
    let response: IpInfoResponse = serde_json::from_str(body)
        .map_err(|e| CoreError::SelfIpLookupFailed(format!("Failed to parse response: {e}")))?;
    response
        .ip
        .trim()
        .parse()
        .map_err(|_| {
            CoreError::SelfIpLookupFailed(format!("'{}' is not an IPv4 address", response.ip))
        })
}
