use std::fs;
use std::path::{Path, PathBuf};

use daybook_core::StateMap;
use serde_json::Value;
use tracing::warn;

use crate::error::StoreError;

/// The latest imported daily state (`state.json`).
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Empty when the file is missing or does not hold an object.
    pub fn load(&self) -> Result<StateMap, StoreError> {
        if !self.path.exists() {
            return Ok(StateMap::new());
        }
        let text = fs::read_to_string(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        let doc: Value = serde_json::from_str(&text).map_err(|source| StoreError::InvalidDocument {
            path: self.path.clone(),
            source,
        })?;
        match doc {
            Value::Object(map) => Ok(map),
            _ => {
                warn!(path = %self.path.display(), "state file is not a JSON object; ignoring it");
                Ok(StateMap::new())
            }
        }
    }

    pub fn save(&self, state: &StateMap) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
        }
        let body = serde_json::to_string_pretty(state).map_err(|source| StoreError::InvalidDocument {
            path: self.path.clone(),
            source,
        })?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body + "\n").map_err(|e| StoreError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| StoreError::io(&self.path, e))
    }
}
