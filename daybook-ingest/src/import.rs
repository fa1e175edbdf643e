//! Turn a journal into a state snapshot plus tasks to append.
//!
//! Planning is pure; the caller persists the result.

use std::collections::HashSet;

use chrono::NaiveDateTime;
use daybook_core::{DEFAULT_PROJECT, StateMap, Task};
use serde_json::Value;
use tracing::{debug, warn};

use crate::types::{Journal, SNAPSHOT_FIELDS};

#[derive(Debug, Clone, PartialEq)]
pub struct ImportPlan {
    /// Replaces the whole state file.
    pub state: StateMap,
    /// New tasks in journal order, ids already assigned.
    pub new_tasks: Vec<Task>,
    /// Entries dropped because their text already exists.
    pub duplicates: usize,
    /// `new_tasks` was present but not an array.
    pub malformed_new_tasks: bool,
}

pub fn state_snapshot(journal: &Journal, now: NaiveDateTime) -> StateMap {
    let mut state = StateMap::new();
    state.insert("date".into(), journal.date().cloned().unwrap_or(Value::Null));
    for field in SNAPSHOT_FIELDS {
        let value = journal.get(field).cloned().unwrap_or_else(|| match field {
            "free_note" => Value::String(String::new()),
            _ => Value::Object(StateMap::new()),
        });
        state.insert(field.into(), value);
    }
    state.insert(
        "last_imported_at".into(),
        Value::String(now.format("%Y-%m-%dT%H:%M:%S").to_string()),
    );
    state
}

/// Build the snapshot and the tasks to add.
///
/// Entries whose text matches an existing task (or an earlier entry) are
/// skipped. Ids continue from the highest existing id.
pub fn plan_import(existing: &[Task], journal: &Journal, now: NaiveDateTime) -> ImportPlan {
    let state = state_snapshot(journal, now);

    let Some(entries) = journal.new_task_entries() else {
        warn!("new_tasks is not an array; skipping task creation");
        return ImportPlan {
            state,
            new_tasks: Vec::new(),
            duplicates: 0,
            malformed_new_tasks: true,
        };
    };

    let mut seen: HashSet<&str> = existing.iter().map(|t| t.text.as_str()).collect();
    let mut next_id = existing.iter().map(|t| t.id).max().unwrap_or(0) + 1;
    let created_at = now.date().to_string();
    let mut new_tasks = Vec::new();
    let mut duplicates = 0;

    for entry in &entries {
        if !seen.insert(entry.text.as_str()) {
            duplicates += 1;
            continue;
        }

        let mut task = Task::new(next_id, entry.text.clone())
            .with_project(entry.project.as_deref().unwrap_or(DEFAULT_PROJECT))
            .with_tags(entry.tags_hint.iter().cloned())
            .with_created_at(created_at.clone());
        task.due_date = entry.due_date.clone();
        task.priority_hint = entry.priority_hint.clone();

        new_tasks.push(task);
        next_id += 1;
    }

    debug!(added = new_tasks.len(), duplicates, "planned journal import");
    ImportPlan {
        state,
        new_tasks,
        duplicates,
        malformed_new_tasks: false,
    }
}
