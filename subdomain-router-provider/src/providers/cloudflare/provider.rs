//! Cloudflare `DnsProvider` implementation

use async_trait::async_trait;

use crate::error::Result;
use crate::providers::common::{full_name_to_relative, parse_record_type, relative_to_full_name};
use crate::traits::{DnsProvider, ErrorContext, ProviderErrorMapper};
use crate::types::{CreateDnsRecordRequest, DnsRecord, UpdateDnsRecordRequest};

use super::types::CloudflareRecordBody;
use super::{
    AUTO_TTL, CloudflareDnsRecord, CloudflareProvider, CloudflareZone, MAX_PAGE_SIZE_RECORDS,
};

impl CloudflareProvider {
    /// Zone name for `zone_id`, fetched once and cached.
    pub(crate) async fn zone_name(&self, zone_id: &str) -> Result<String> {
        if let Some(name) = self.zone_names.read().await.get(zone_id) {
            return Ok(name.clone());
        }

        let zone: CloudflareZone = self
            .get(
                &format!("/zones/{zone_id}"),
                ErrorContext {
                    domain: Some(zone_id.to_string()),
                    ..ErrorContext::default()
                },
            )
            .await?;
        log::debug!("[cloudflare] zone {} is {}", zone.id, zone.name);

        self.zone_names
            .write()
            .await
            .insert(zone_id.to_string(), zone.name.clone());
        Ok(zone.name)
    }

    /// Convert an API record; `None` for record types this library does not model.
    pub(crate) fn cf_record_to_dns_record(
        cf_record: CloudflareDnsRecord,
        zone_id: &str,
        zone_name: &str,
    ) -> Option<DnsRecord> {
        let Some(record_type) = parse_record_type(&cf_record.record_type) else {
            log::debug!(
                "[cloudflare] skipping {} record {}",
                cf_record.record_type,
                cf_record.name
            );
            return None;
        };

        Some(DnsRecord {
            id: cf_record.id,
            zone_id: zone_id.to_string(),
            name: full_name_to_relative(&cf_record.name, zone_name),
            record_type,
            content: cf_record.content,
            ttl: cf_record.ttl,
            proxied: cf_record.proxied,
        })
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    fn id(&self) -> &'static str {
        "cloudflare"
    }

    async fn list_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>> {
        let zone_name = self.zone_name(zone_id).await?;

        let mut records = Vec::new();
        let mut page = 1;
        loop {
            let path = format!(
                "/zones/{}/dns_records?page={page}&per_page={MAX_PAGE_SIZE_RECORDS}",
                urlencoding::encode(zone_id)
            );
            let (cf_records, info): (Vec<CloudflareDnsRecord>, _) = self
                .get_page(
                    &path,
                    ErrorContext {
                        domain: Some(zone_id.to_string()),
                        ..ErrorContext::default()
                    },
                )
                .await?;

            let fetched = u32::try_from(cf_records.len()).unwrap_or(u32::MAX);
            records.extend(
                cf_records
                    .into_iter()
                    .filter_map(|r| Self::cf_record_to_dns_record(r, zone_id, &zone_name)),
            );

            let last_page = match info {
                Some(info) => match info.total_pages {
                    Some(total_pages) => info.page >= total_pages,
                    None => info.page.saturating_mul(MAX_PAGE_SIZE_RECORDS) >= info.total_count,
                },
                None => true,
            };
            if last_page || fetched < MAX_PAGE_SIZE_RECORDS {
                break;
            }
            page += 1;
        }

        log::debug!("[cloudflare] listed {} records in zone {zone_name}", records.len());
        Ok(records)
    }

    async fn create_record(&self, req: &CreateDnsRecordRequest) -> Result<DnsRecord> {
        let zone_name = self.zone_name(&req.zone_id).await?;

        let body = CloudflareRecordBody {
            record_type: req.record_type.as_str(),
            name: relative_to_full_name(&req.name, &zone_name),
            content: &req.content,
            ttl: AUTO_TTL,
            proxied: req.proxied,
        };

        let cf_record: CloudflareDnsRecord = self
            .post(
                &format!("/zones/{}/dns_records", req.zone_id),
                &body,
                ErrorContext {
                    record_name: Some(req.name.clone()),
                    domain: Some(req.zone_id.clone()),
                    ..ErrorContext::default()
                },
            )
            .await?;

        Self::cf_record_to_dns_record(cf_record, &req.zone_id, &zone_name)
            .ok_or_else(|| self.parse_error("created record has an unexpected type"))
    }

    async fn update_record(
        &self,
        record_id: &str,
        req: &UpdateDnsRecordRequest,
    ) -> Result<DnsRecord> {
        let zone_name = self.zone_name(&req.zone_id).await?;

        let body = CloudflareRecordBody {
            record_type: req.record_type.as_str(),
            name: relative_to_full_name(&req.name, &zone_name),
            content: &req.content,
            ttl: AUTO_TTL,
            proxied: req.proxied,
        };

        let cf_record: CloudflareDnsRecord = self
            .patch(
                &format!("/zones/{}/dns_records/{record_id}", req.zone_id),
                &body,
                ErrorContext {
                    record_name: Some(req.name.clone()),
                    record_id: Some(record_id.to_string()),
                    domain: Some(req.zone_id.clone()),
                },
            )
            .await?;

        Self::cf_record_to_dns_record(cf_record, &req.zone_id, &zone_name)
            .ok_or_else(|| self.parse_error("updated record has an unexpected type"))
    }

    async fn delete_record(&self, record_id: &str, zone_id: &str) -> Result<()> {
        self.delete(
            &format!("/zones/{zone_id}/dns_records/{record_id}"),
            ErrorContext {
                record_id: Some(record_id.to_string()),
                domain: Some(zone_id.to_string()),
                ..ErrorContext::default()
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DnsRecordType;

    fn cf_record(record_type: &str, name: &str, content: &str) -> CloudflareDnsRecord {
        CloudflareDnsRecord {
            id: "rec-1".to_string(),
            record_type: record_type.to_string(),
            name: name.to_string(),
            content: content.to_string(),
            ttl: 1,
            proxied: Some(true),
        }
    }

    #[test]
    fn converts_full_name_to_relative() {
        let record = CloudflareProvider::cf_record_to_dns_record(
            cf_record("A", "blog.example.com", "203.0.113.1"),
            "zone-1",
            "example.com",
        );
        assert_eq!(
            record,
            Some(DnsRecord {
                id: "rec-1".to_string(),
                zone_id: "zone-1".to_string(),
                name: "blog".to_string(),
                record_type: DnsRecordType::A,
                content: "203.0.113.1".to_string(),
                ttl: 1,
                proxied: Some(true),
            })
        );
    }

    #[test]
    fn apex_becomes_at() {
        let record = CloudflareProvider::cf_record_to_dns_record(
            cf_record("A", "example.com", "203.0.113.1"),
            "zone-1",
            "example.com",
        );
        assert_eq!(record.map(|r| r.name), Some("@".to_string()));
    }

    #[test]
    fn unmodelled_type_is_skipped() {
        let record = CloudflareProvider::cf_record_to_dns_record(
            cf_record("HTTPS", "blog.example.com", "1 . alpn=h2"),
            "zone-1",
            "example.com",
        );
        assert!(record.is_none());
    }

    #[test]
    fn record_body_serializes_like_the_api_expects() {
        let body = CloudflareRecordBody {
            record_type: DnsRecordType::A.as_str(),
            name: relative_to_full_name("blog", "example.com"),
            content: "203.0.113.1",
            ttl: AUTO_TTL,
            proxied: true,
        };
        let json = serde_json::to_value(&body).unwrap_or_default();
        assert_eq!(json["type"], "A");
        assert_eq!(json["name"], "blog.example.com");
        assert_eq!(json["ttl"], 1);
        assert_eq!(json["proxied"], true);
    }
}
