//! Helpers shared by provider implementations.

use std::time::Duration;

use reqwest::Client;

use crate::types::DnsRecordType;

// ============ HTTP Client ============

/// Connect timeout (seconds).
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Whole-request timeout (seconds).
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Build an HTTP client with connect and request timeouts.
pub fn create_http_client() -> Client {
    Client::builder()
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|e| {
            log::error!("Failed to build configured HTTP client, using defaults: {e}");
            Client::new()
        })
}

// ============ Record types ============

/// Parse a provider type string; `None` for types this library does not model.
pub fn parse_record_type(record_type: &str) -> Option<DnsRecordType> {
    match record_type.to_uppercase().as_str() {
        "A" => Some(DnsRecordType::A),
        "AAAA" => Some(DnsRecordType::Aaaa),
        "CNAME" => Some(DnsRecordType::Cname),
        "MX" => Some(DnsRecordType::Mx),
        "TXT" => Some(DnsRecordType::Txt),
        "NS" => Some(DnsRecordType::Ns),
        "SRV" => Some(DnsRecordType::Srv),
        "CAA" => Some(DnsRecordType::Caa),
        _ => None,
    }
}

// ============ Names ============

/// Strip the trailing dot of a domain name.
pub fn normalize_domain_name(name: &str) -> &str {
    name.trim_end_matches('.')
}

/// Convert a full name to a name relative to the zone.
///
/// `"www.example.com"` + `"example.com"` -> `"www"`,
/// `"example.com"` + `"example.com"` -> `"@"`.
/// Names outside the zone are returned unchanged (minus a trailing dot).
pub fn full_name_to_relative(full_name: &str, zone_name: &str) -> String {
    let full = normalize_domain_name(full_name);
    let zone = normalize_domain_name(zone_name);

    if full.eq_ignore_ascii_case(zone) {
        return "@".to_string();
    }
    match full.len().checked_sub(zone.len() + 1) {
        Some(dot)
            if dot > 0
                && full.as_bytes()[dot] == b'.'
                && full[dot + 1..].eq_ignore_ascii_case(zone) =>
        {
            full[..dot].to_string()
        }
        _ => full.to_string(),
    }
}

/// Convert a relative name to a full name.
///
/// `"www"` + `"example.com"` -> `"www.example.com"`,
/// `"@"` + `"example.com"` -> `"example.com"`.
/// Names already inside the zone are returned unchanged.
pub fn relative_to_full_name(relative_name: &str, zone_name: &str) -> String {
    let zone = normalize_domain_name(zone_name);
    let name = normalize_domain_name(relative_name);

    if name == "@" || name.is_empty() {
        zone.to_string()
    } else if full_name_to_relative(name, zone) != name {
        name.to_string()
    } else {
        format!("{name}.{zone}")
    }
}
