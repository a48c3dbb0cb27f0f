//! JSON file registry store.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{CoreError, CoreResult};
use crate::traits::RegistryStore;

/// Registry kept in one JSON file.
///
/// Every write goes to its own temp file in the same directory and is then
/// renamed into place, so a crash mid-save leaves the previous registry
/// intact and overlapping saves never share a temp file.
pub struct JsonFileRegistryStore {
    path: PathBuf,
}

impl JsonFileRegistryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn write_atomic(path: &Path, json: &str) -> CoreResult<()> {
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| {
            CoreError::StorageError(format!("temp file in {}: {e}", dir.display()))
        })?;
        tmp.write_all(json.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| {
                CoreError::StorageError(format!("write {}: {e}", tmp.path().display()))
            })?;
        tmp.persist(path).map_err(|e| {
            CoreError::StorageError(format!("rename into {}: {}", path.display(), e.error))
        })?;
        Ok(())
    }
}

#[async_trait]
impl RegistryStore for JsonFileRegistryStore {
    async fn load_raw_json(&self) -> CoreResult<String> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => Ok(json),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::warn!(
                    "Registry file {} not found, starting empty",
                    self.path.display()
                );
                Ok("{}".to_string())
            }
            Err(e) => Err(CoreError::StorageError(format!(
                "read {}: {e}",
                self.path.display()
            ))),
        }
    }

    async fn save_raw_json(&self, json: &str) -> CoreResult<()> {
        let path = self.path.clone();
        let json = json.to_string();
        tokio::task::spawn_blocking(move || Self::write_atomic(&path, &json))
            .await
            .map_err(|e| CoreError::StorageError(format!("save task failed: {e}")))??;
        log::debug!("Registry saved to {}", self.path.display());
        Ok(())
    }
}
