//! services/api/src/adapters/json_store.rs
//!
//! File-backed record store. All collections live in one JSON document that is
//! rewritten after every committed change, the way a browser's local storage
//! would hold them.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use salon_core::{InMemoryStore, PortError, PortResult, SnapshotSink, StoreSnapshot};
use tracing::{debug, info};

/// Writes snapshots to `path` through a temporary file and a rename, so a
/// crash mid-write never leaves a truncated document behind.
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "store".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SnapshotSink for JsonFileSink {
    async fn persist(&self, snapshot: &StoreSnapshot) -> PortResult<()> {
        let json =
            serde_json::to_vec_pretty(snapshot).map_err(|e| PortError::Unexpected(e.to_string()))?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, json)
            .await
            .map_err(|e| PortError::Unexpected(format!("writing {}: {}", temp.display(), e)))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| PortError::Unexpected(format!("replacing {}: {}", self.path.display(), e)))?;
        debug!("Persisted store to {}", self.path.display());
        Ok(())
    }
}

/// Opens (or starts) the JSON store at `path`, creating parent directories.
pub async fn open_json_store(path: &Path) -> PortResult<InMemoryStore> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| PortError::Unexpected(format!("creating {}: {}", parent.display(), e)))?;
    }

    let snapshot = match tokio::fs::read(path).await {
        Ok(bytes) => serde_json::from_slice::<StoreSnapshot>(&bytes)
            .map_err(|e| PortError::Unexpected(format!("parsing {}: {}", path.display(), e)))?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("No data file at {}, starting empty", path.display());
            StoreSnapshot::default()
        }
        Err(e) => {
            return Err(PortError::Unexpected(format!(
                "reading {}: {}",
                path.display(),
                e
            )))
        }
    };

    Ok(InMemoryStore::with_sink(
        snapshot,
        Box::new(JsonFileSink::new(path.to_path_buf())),
    ))
}
