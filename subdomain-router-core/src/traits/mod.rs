//! Storage layer abstraction trait definition

mod registry_store;

pub use registry_store::RegistryStore;
