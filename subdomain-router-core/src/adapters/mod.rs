//! Storage adapters

mod json_file_registry_store;

pub use json_file_registry_store::JsonFileRegistryStore;
