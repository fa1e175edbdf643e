//! daybook-store: flat-file persistence under one data directory.

pub mod error;
pub mod master;
pub mod state_file;
pub mod tasks;

use std::path::{Path, PathBuf};

pub use error::StoreError;
pub use master::{MasterStore, projects_from, tag_weights_from};
pub use state_file::StateFile;
pub use tasks::{CompleteOutcome, CorruptEntry, LoadReport, TaskLog, next_id};

pub const TASKS_FILE: &str = "tasks.jsonl";
pub const STATE_FILE: &str = "state.json";
pub const TAGS_MASTER_FILE: &str = "tags_master.json";
pub const PROJECTS_FILE: &str = "projects.json";

/// Layout of the data directory.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tasks(&self) -> TaskLog {
        TaskLog::new(self.root.join(TASKS_FILE))
    }

    pub fn state(&self) -> StateFile {
        StateFile::new(self.root.join(STATE_FILE))
    }

    pub fn masters(&self) -> MasterStore {
        MasterStore::new(self.root.join(TAGS_MASTER_FILE), self.root.join(PROJECTS_FILE))
    }
}
