use serde::{Deserialize, Serialize};

// ============ DNS Record Types ============

/// DNS record type identifier.
///
/// Serialized as uppercase strings (`"A"`, `"AAAA"`, `"CNAME"`, etc.).
/// Only `A` records are ever written by this workspace; the other variants
/// exist so a zone listing can report what already occupies a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DnsRecordType {
    /// IPv4 address record.
    A,
    /// IPv6 address record.
    Aaaa,
    /// Canonical name (alias) record.
    Cname,
    /// Mail exchange record.
    Mx,
    /// Text record.
    Txt,
    /// Name server record.
    Ns,
    /// Service locator record.
    Srv,
    /// Certificate Authority Authorization record.
    Caa,
}

impl DnsRecordType {
    /// Uppercase wire name, as used by provider APIs and the registry file.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Cname => "CNAME",
            Self::Mx => "MX",
            Self::Txt => "TXT",
            Self::Ns => "NS",
            Self::Srv => "SRV",
            Self::Caa => "CAA",
        }
    }
}

impl std::fmt::Display for DnsRecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A DNS record as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsRecord {
    /// Provider-specific record identifier.
    pub id: String,
    /// Zone this record belongs to.
    pub zone_id: String,
    /// Record name relative to the zone (`"www"`, or `"@"` for the apex).
    pub name: String,
    /// Record type.
    pub record_type: DnsRecordType,
    /// Record content (the IPv4 address for `A` records).
    pub content: String,
    /// Time to live in seconds (`1` means automatic on Cloudflare).
    pub ttl: u32,
    /// Whether the provider's proxy is enabled, if the provider has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxied: Option<bool>,
}

/// Request to create a new DNS record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDnsRecordRequest {
    /// Zone to create the record in.
    pub zone_id: String,
    /// Record name relative to the zone.
    pub name: String,
    /// Record type.
    pub record_type: DnsRecordType,
    /// Record content.
    pub content: String,
    /// Enable the provider's proxy.
    pub proxied: bool,
}

/// Request to update an existing DNS record, addressed by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDnsRecordRequest {
    /// Zone the record belongs to.
    pub zone_id: String,
    /// Record name relative to the zone.
    pub name: String,
    /// Record type.
    pub record_type: DnsRecordType,
    /// New record content.
    pub content: String,
    /// Enable the provider's proxy.
    pub proxied: bool,
}
