//! Registry storage abstraction Trait

use async_trait::async_trait;

use crate::error::CoreResult;

/// Durable home of the site registry.
///
/// The store moves raw JSON text only; encoding and decoding live in
/// [`crate::registry`].
///
/// Implementations:
/// - `JsonFileRegistryStore`: a single JSON file on disk
#[async_trait]
pub trait RegistryStore: Send + Sync {
    /// Read the whole registry document.
    ///
    /// A store that has never been written returns `"{}"`.
    async fn load_raw_json(&self) -> CoreResult<String>;

    /// Replace the whole registry document.
    async fn save_raw_json(&self, json: &str) -> CoreResult<()>;
}
