//! `tasks.jsonl`: one task record per line.
//!
//! Appends are plain line writes. Full rewrites (completion) go through a
//! temp file + rename so a crash never leaves a half-written log. Derived
//! scoring fields are stripped before anything is written.

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use daybook_core::Task;
use tracing::{debug, warn};

use crate::error::StoreError;

const FRAGMENT_CHARS: usize = 80;

/// A line skipped by [`TaskLog::load_report`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorruptEntry {
    pub line: usize,
    pub fragment: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub tasks: Vec<Task>,
    pub corrupt: Vec<CorruptEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompleteOutcome {
    Completed,
    AlreadyDone,
    NotFound,
}

#[derive(Debug, Clone)]
pub struct TaskLog {
    path: PathBuf,
}

impl TaskLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All tasks; the first corrupt line aborts with [`StoreError::Corrupt`].
    pub fn load(&self) -> Result<Vec<Task>, StoreError> {
        Ok(self.read(true)?.tasks)
    }

    /// All parseable tasks, plus a report of the lines that were skipped.
    pub fn load_report(&self) -> Result<LoadReport, StoreError> {
        self.read(false)
    }

    fn read(&self, strict: bool) -> Result<LoadReport, StoreError> {
        let mut report = LoadReport::default();
        if !self.path.exists() {
            return Ok(report);
        }

        let f = fs::File::open(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        for (idx, line) in BufReader::new(f).lines().enumerate() {
            let line = line.map_err(|e| StoreError::io(&self.path, e))?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            match serde_json::from_str::<Task>(trimmed) {
                Ok(task) => report.tasks.push(task),
                Err(source) => {
                    let fragment: String = trimmed.chars().take(FRAGMENT_CHARS).collect();
                    if strict {
                        return Err(StoreError::Corrupt {
                            path: self.path.clone(),
                            line: idx + 1,
                            fragment,
                            source,
                        });
                    }
                    warn!(path = %self.path.display(), line = idx + 1, error = %source, "skipping corrupt task entry");
                    report.corrupt.push(CorruptEntry {
                        line: idx + 1,
                        fragment,
                        message: source.to_string(),
                    });
                }
            }
        }

        debug!(path = %self.path.display(), tasks = report.tasks.len(), "loaded task log");
        Ok(report)
    }

    pub fn append(&self, task: &Task) -> Result<(), StoreError> {
        self.ensure_parent()?;
        let line = encode(task)?;
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::io(&self.path, e))?;
        writeln!(f, "{line}").map_err(|e| StoreError::io(&self.path, e))
    }

    /// Rewrite the whole log.
    pub fn save(&self, tasks: &[Task]) -> Result<(), StoreError> {
        self.ensure_parent()?;
        let mut body = String::new();
        for t in tasks {
            body.push_str(&encode(t)?);
            body.push('\n');
        }

        let tmp = self.path.with_extension("jsonl.tmp");
        fs::write(&tmp, body).map_err(|e| StoreError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| StoreError::io(&self.path, e))
    }

    pub fn next_id(&self) -> Result<i64, StoreError> {
        Ok(next_id(&self.load()?))
    }

    /// Mark `id` done. Only `Completed` rewrites the log.
    pub fn complete(&self, id: i64, completed_at: &str) -> Result<CompleteOutcome, StoreError> {
        let mut tasks = self.load()?;
        let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(CompleteOutcome::NotFound);
        };
        if !task.complete(completed_at) {
            return Ok(CompleteOutcome::AlreadyDone);
        }
        self.save(&tasks)?;
        Ok(CompleteOutcome::Completed)
    }

    fn ensure_parent(&self) -> Result<(), StoreError> {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => {
                fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))
            }
            _ => Ok(()),
        }
    }
}

/// Max id + 1; 1 for an empty log.
pub fn next_id(tasks: &[Task]) -> i64 {
    tasks.iter().map(|t| t.id).max().map_or(1, |max| max + 1)
}

fn encode(task: &Task) -> Result<String, StoreError> {
    let mut t = task.clone();
    t.clear_derived();
    serde_json::to_string(&t).map_err(|source| StoreError::Encode { id: t.id, source })
}
