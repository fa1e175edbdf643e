use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A task-log line that is not a valid task record.
    #[error("corrupt entry at {path}:{line}: {source} (near `{fragment}`)")]
    Corrupt {
        path: PathBuf,
        line: usize,
        fragment: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    InvalidDocument {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode task {id}: {source}")]
    Encode {
        id: i64,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
