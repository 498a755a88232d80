use std::path::PathBuf;

use crate::kv::FileStore;

/// Storage configuration.
///
/// Callers resolve the directory from flags, `GIAOAN_DATA_DIR` and the
/// config file, falling back to [`StoreConfig::default_dir`]
/// (`~/.local/share/giaoan` on Linux).
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding one file per stored key.
    pub data_dir: PathBuf,
}

impl StoreConfig {
    /// Environment variable overriding the data directory.
    pub const ENV_VAR: &str = "GIAOAN_DATA_DIR";

    /// Default data directory used when nothing else is configured.
    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("giaoan")
    }

    /// Build a config from an explicit directory (useful for tests and CLI flags).
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Open the file-backed store this config points at.
    pub fn open(&self) -> FileStore {
        FileStore::new(self.data_dir.clone())
    }
}
