use std::path::{Path, PathBuf};

use crate::core::todo::ToDo;

use super::error::StoreError;

/// Durable storage behind a [`RecordStore`](super::RecordStore).
///
/// `save` receives the complete record set after a mutation and must either
/// persist all of it or fail without changing what a later `load` returns.
pub trait Backend: Send {
    fn load(&mut self) -> Result<Vec<ToDo>, StoreError>;
    fn save(&mut self, records: &[ToDo]) -> Result<(), StoreError>;
}

/// Keeps records in memory only. Used for tests and throwaway sessions.
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    records: Vec<ToDo>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<ToDo>) -> Self {
        Self { records }
    }
}

impl Backend for MemoryBackend {
    fn load(&mut self) -> Result<Vec<ToDo>, StoreError> {
        Ok(self.records.clone())
    }

    fn save(&mut self, records: &[ToDo]) -> Result<(), StoreError> {
        self.records = records.to_vec();
        Ok(())
    }
}

/// A single JSON file holding the whole record set.
///
/// Writes go to a sibling temp file which is then renamed over the target.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "todos.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl Backend for JsonFileBackend {
    fn load(&mut self) -> Result<Vec<ToDo>, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No store at {}, starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(self.io_err(e)),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&mut self, records: &[ToDo]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(records)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
            }
        }
        let tmp = self.temp_path();
        std::fs::write(&tmp, json).map_err(|e| self.io_err(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_err(e))?;
        Ok(())
    }
}
