//! Subdomain Router Core Library
//!
//! Keeps a local site registry (`name -> target`) and a DNS provider's
//! A-records in agreement, and answers "where does this visitor go":
//! - Site registry model and its durable JSON codec
//! - Record reconciliation between the registry and the provider
//! - Redirect resolution for incoming host/path pairs
//! - Management operations (add, delete, list, reload, save)
//!
//! Storage and the provider are reached through traits, so the whole core can
//! run against in-memory doubles.

pub mod adapters;
pub mod error;
pub mod registry;
pub mod resolver;
pub mod services;
pub mod state;
pub mod traits;
pub mod types;

#[cfg(test)]
mod test_utils;

pub use error::{CoreError, CoreResult};
pub use resolver::Resolution;
pub use services::{ReconcileService, ServiceContext, SiteService, ZoneSettings};
pub use state::SiteState;
pub use traits::RegistryStore;
