//! Core type definitions

mod record;
mod site;

pub use record::{ReconcileOutcome, ReconcileReport, ReconciledRecord, RemoteRecord};
pub use site::{RecordKind, SiteEntry, TargetForm};
