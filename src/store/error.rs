use std::path::PathBuf;

use thiserror::Error;

/// Storage failures. None of these are retried; all but `DuplicateId` are fatal.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("store data at {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode records: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("a record with id {0} already exists")]
    DuplicateId(i64),
    #[error("store is unavailable after an earlier fatal error")]
    Failed,
}
