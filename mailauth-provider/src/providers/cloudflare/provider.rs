//! Cloudflare `DnsZoneProvider` implementation

use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;

use crate::error::{ProviderError, Result};
use crate::providers::common::{full_name_to_relative, parse_record_type, relative_to_full_name};
use crate::traits::{DnsZoneProvider, ErrorContext, ProviderErrorMapper};
use crate::types::{CreateRecordOutcome, CreateZoneRecordRequest, Zone, ZoneRecord, ZoneStatus};

use super::{CloudflareDnsRecord, CloudflareProvider, CloudflareZone, MAX_PAGE_SIZE_RECORDS};

impl CloudflareProvider {
    /// Cloudflare zone statuses: active, pending, initializing, moved, deleted
    pub(crate) fn cf_zone_to_zone(zone: CloudflareZone) -> Zone {
        let status = match zone.status.as_str() {
            "active" => ZoneStatus::Active,
            "pending" | "initializing" => ZoneStatus::Pending,
            "moved" => ZoneStatus::Moved,
            _ => ZoneStatus::Unknown,
        };

        Zone {
            id: zone.id,
            name: zone.name,
            name_servers: zone.name_servers,
            status,
        }
    }

    pub(crate) fn cf_record_to_zone_record(
        &self,
        cf_record: CloudflareDnsRecord,
        zone_id: &str,
        zone_name: &str,
    ) -> Result<ZoneRecord> {
        let record_type = parse_record_type(&cf_record.record_type, self.provider_name())?;

        Ok(ZoneRecord {
            id: cf_record.id,
            zone_id: zone_id.to_string(),
            record_type,
            name: full_name_to_relative(&cf_record.name, zone_name),
            value: cf_record.content,
            ttl: cf_record.ttl,
            priority: cf_record.priority,
        })
    }
}

#[async_trait]
impl DnsZoneProvider for CloudflareProvider {
    fn id(&self) -> &'static str {
        "cloudflare"
    }

    async fn create_zone(&self, domain: &str) -> Result<Zone> {
        let body = json!({
            "name": domain,
            "account": { "id": self.account_id },
            "type": "full",
        });

        let zone: CloudflareZone = self
            .request_result(Method::POST, "/zones", Some(&body), ErrorContext::domain(domain))
            .await?;

        log::info!("[cloudflare] Created zone {} ({})", zone.name, zone.id);
        Ok(Self::cf_zone_to_zone(zone))
    }

    async fn get_zone(&self, zone_id: &str) -> Result<Zone> {
        let zone: CloudflareZone = self
            .request_result(
                Method::GET,
                &format!("/zones/{zone_id}"),
                None,
                ErrorContext::domain(zone_id),
            )
            .await?;
        Ok(Self::cf_zone_to_zone(zone))
    }

    async fn get_zone_by_name(&self, domain: &str) -> Result<Option<Zone>> {
        let path = format!(
            "/zones?name={}&account.id={}",
            urlencoding::encode(domain),
            urlencoding::encode(&self.account_id)
        );
        let zones: Vec<CloudflareZone> = self
            .request(Method::GET, &path, None, ErrorContext::domain(domain))
            .await?
            .result
            .unwrap_or_default();

        Ok(zones
            .into_iter()
            .find(|z| z.name.eq_ignore_ascii_case(domain))
            .map(Self::cf_zone_to_zone))
    }

    async fn create_record(&self, req: &CreateZoneRecordRequest) -> Result<CreateRecordOutcome> {
        let zone = self.get_zone(&req.zone_id).await?;
        let full_name = relative_to_full_name(&req.name, &zone.name);

        let mut body = json!({
            "type": req.record_type.to_string(),
            "name": full_name,
            "content": req.value,
            "ttl": req.ttl,
        });
        if let Some(priority) = req.priority {
            body["priority"] = json!(priority);
        }

        let ctx = ErrorContext {
            record_name: Some(req.name.clone()),
            domain: Some(zone.name.clone()),
            ..ErrorContext::default()
        };

        match self
            .request_result::<CloudflareDnsRecord>(
                Method::POST,
                &format!("/zones/{}/dns_records", req.zone_id),
                Some(&body),
                ctx,
            )
            .await
        {
            Ok(cf_record) => self
                .cf_record_to_zone_record(cf_record, &req.zone_id, &zone.name)
                .map(CreateRecordOutcome::Created),
            Err(ProviderError::RecordExists { record_name, .. }) => {
                log::info!(
                    "[cloudflare] {} record '{record_name}' already exists in {}, skipping",
                    req.record_type,
                    zone.name
                );
                Ok(CreateRecordOutcome::Skipped { name: record_name })
            }
            Err(e) => Err(e),
        }
    }

    async fn list_records(&self, zone_id: &str) -> Result<Vec<ZoneRecord>> {
        let zone = self.get_zone(zone_id).await?;
        let mut records = Vec::new();
        let mut page = 1;

        loop {
            let path =
                format!("/zones/{zone_id}/dns_records?page={page}&per_page={MAX_PAGE_SIZE_RECORDS}");
            let response = self
                .request::<Vec<CloudflareDnsRecord>>(
                    Method::GET,
                    &path,
                    None,
                    ErrorContext::domain(&zone.name),
                )
                .await?;

            let total_count = response.result_info.map_or(0, |i| i.total_count);
            let batch = response.result.unwrap_or_default();
            let exhausted = batch.is_empty();

            for cf_record in batch {
                // Record types this crate does not manage (A, NS, ...) are not surfaced
                if parse_record_type(&cf_record.record_type, self.provider_name()).is_err() {
                    continue;
                }
                records.push(self.cf_record_to_zone_record(cf_record, zone_id, &zone.name)?);
            }

            if exhausted || page * MAX_PAGE_SIZE_RECORDS >= total_count {
                break;
            }
            page += 1;
        }

        Ok(records)
    }

    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<()> {
        let ctx = ErrorContext {
            record_id: Some(record_id.to_string()),
            ..ErrorContext::default()
        };
        self.request::<serde_json::Value>(
            Method::DELETE,
            &format!("/zones/{zone_id}/dns_records/{record_id}"),
            None,
            ctx,
        )
        .await?;
        Ok(())
    }
}
