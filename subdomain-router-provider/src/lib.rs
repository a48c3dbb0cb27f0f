//! # subdomain-router-provider
//!
//! Thin client for the DNS provider that holds the live A-records of the
//! managed zone. The rest of the workspace only ever talks to the
//! [`DnsProvider`] trait, so the reconciler can be exercised against an
//! in-memory provider in tests.
//!
//! ## Feature Flags
//!
//! - **`cloudflare`** *(default)*: Enable the Cloudflare provider.
//! - **`rustls`** *(default)*: Use rustls as TLS backend.
//! - **`native-tls`**: Use the platform's native TLS implementation.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use subdomain_router_provider::{
//!     CloudflareProvider, CreateDnsRecordRequest, DnsProvider, DnsRecordType,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = CloudflareProvider::new("your-token".to_string());
//!
//!     for record in provider.list_records("zone-id").await? {
//!         println!("{} {:?} -> {}", record.name, record.record_type, record.content);
//!     }
//!
//!     let created = provider
//!         .create_record(&CreateDnsRecordRequest {
//!             zone_id: "zone-id".to_string(),
//!             name: "blog".to_string(),
//!             record_type: DnsRecordType::A,
//!             content: "203.0.113.1".to_string(),
//!             proxied: true,
//!         })
//!         .await?;
//!     println!("created {}", created.id);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, ProviderError>`](ProviderError).
//! Transient errors (`NetworkError`, `Timeout`, `RateLimited`) on reads are
//! retried with exponential backoff; mutations are sent exactly once.

mod error;
mod http_client;
mod providers;
mod traits;
mod types;
mod utils;

pub use error::{ProviderError, Result};

pub use traits::DnsProvider;

pub use types::{CreateDnsRecordRequest, DnsRecord, DnsRecordType, UpdateDnsRecordRequest};

pub use providers::common::{full_name_to_relative, relative_to_full_name};

pub use utils::log_sanitizer::truncate_for_log;

#[cfg(feature = "cloudflare")]
pub use providers::CloudflareProvider;
