use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::store::{IdStrategy, JsonFileBackend, RecordStore, StoreError};

pub const APP_DIR: &str = "todo-list";
pub const STORE_FILE: &str = "todos.json";

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join(APP_DIR)
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct TodoConfig {
    pub data_directory: PathBuf,
    pub debug_logging: bool,
    pub id_strategy: IdStrategy,
}

impl Default for TodoConfig {
    fn default() -> Self {
        Self {
            data_directory: default_data_dir(),
            debug_logging: false,
            id_strategy: IdStrategy::default(),
        }
    }
}

impl TodoConfig {
    /// `~/.config/todo-list/config.json` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join(APP_DIR)
            .join("config.json")
    }

    /// Read the config at `path`. A missing or unreadable file gives the defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                log::warn!("Ignoring invalid config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_directory.join(STORE_FILE)
    }

    /// Ensure the data directory exists.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_directory)
    }

    /// Open the file-backed store this config points at.
    pub fn open_store(&self) -> Result<RecordStore, StoreError> {
        self.ensure_dirs().map_err(|source| StoreError::Io {
            path: self.data_directory.clone(),
            source,
        })?;
        RecordStore::open(JsonFileBackend::new(self.store_path()), self.id_strategy)
    }
}
