//! In-memory site registry and reconciled records.

use indexmap::IndexMap;

use crate::types::{ReconciledRecord, RecordKind, RemoteRecord, SiteEntry};

/// The live registry: sites by fully qualified name, plus what we believe the
/// provider holds for each of them.
///
/// Entries keep registry file order; new names are appended.
///
/// Shared behind a `tokio::sync::RwLock`; every mutation below keeps
/// `SiteEntry::provider_record_id` equal to the matching record's id.
#[derive(Debug, Clone, Default)]
pub struct SiteState {
    self_ip: String,
    entries: IndexMap<String, SiteEntry>,
    records: IndexMap<String, ReconciledRecord>,
}

impl SiteState {
    pub fn new(self_ip: impl Into<String>) -> Self {
        Self {
            self_ip: self_ip.into(),
            ..Self::default()
        }
    }

    pub fn self_ip(&self) -> &str {
        &self.self_ip
    }

    pub fn entries(&self) -> &IndexMap<String, SiteEntry> {
        &self.entries
    }

    pub fn records(&self) -> &IndexMap<String, ReconciledRecord> {
        &self.records
    }

    pub fn entry(&self, name: &str) -> Option<&SiteEntry> {
        self.entries.get(name)
    }

    pub fn record(&self, name: &str) -> Option<&ReconciledRecord> {
        self.records.get(name)
    }

    /// Drop everything and take `sites` as the new registry.
    pub fn replace_all(&mut self, sites: impl IntoIterator<Item = (SiteEntry, ReconciledRecord)>) {
        self.entries.clear();
        self.records.clear();
        for (entry, record) in sites {
            self.insert(entry, record);
        }
    }

    pub fn insert(&mut self, entry: SiteEntry, record: ReconciledRecord) {
        let name = entry.name.clone();
        self.entries.insert(name.clone(), entry);
        self.set_record(&name, record);
    }

    /// Insert or replace an entry, leaving its record untouched.
    pub fn upsert_entry(&mut self, entry: SiteEntry) {
        self.entries.insert(entry.name.clone(), entry);
    }

    /// Replace the record for `name` and sync the entry's provider id.
    pub fn set_record(&mut self, name: &str, record: ReconciledRecord) {
        if let Some(entry) = self.entries.get_mut(name) {
            entry.provider_record_id.clone_from(&record.provider_record_id);
        }
        self.records.insert(name.to_string(), record);
    }

    /// Adopt the remote record as the truth for `name`.
    ///
    /// The entry becomes a direct record pointing at the remote content.
    pub fn adopt_remote(&mut self, name: &str, remote: &RemoteRecord) {
        let proxied = match self.entries.get_mut(name) {
            Some(entry) => {
                entry.target.clone_from(&remote.content);
                entry.kind = RecordKind::A;
                entry.proxied
            }
            None => true,
        };
        self.set_record(
            name,
            ReconciledRecord {
                content: remote.content.clone(),
                provider_record_id: Some(remote.provider_record_id.clone()),
                provider_type: remote.provider_type,
                proxied,
            },
        );
    }

    pub fn remove(&mut self, name: &str) -> Option<SiteEntry> {
        self.records.shift_remove(name);
        self.entries.shift_remove(name)
    }

    /// First entry (in registry order) whose leading label equals `label`.
    pub fn find_by_label(&self, label: &str) -> Option<&SiteEntry> {
        self.entries.values().find(|e| e.leading_label() == label)
    }
}
