//! Project master entries and per-project progress.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::task::{DEFAULT_PROJECT, Task, TaskStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Used for `days_left` when a task has no due date of its own.
    #[serde(default)]
    pub default_due_date: Option<String>,
}

pub type ProjectMap = HashMap<String, ProjectInfo>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub total: usize,
    pub done: usize,
    /// 0-100, rounded down.
    pub progress: u32,
}

impl ProjectSummary {
    fn empty(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            total: 0,
            done: 0,
            progress: 0,
        }
    }
}

/// One row per known project, plus `default` and any project id a task uses
/// without it being defined. Sorted by id.
pub fn summarize_projects(tasks: &[Task], projects: &ProjectMap) -> Vec<ProjectSummary> {
    let mut rows: BTreeMap<String, ProjectSummary> = projects
        .iter()
        .map(|(id, info)| {
            let name = info.name.as_deref().unwrap_or(id);
            let description = info.description.as_deref().unwrap_or("");
            (id.clone(), ProjectSummary::empty(id, name, description))
        })
        .collect();

    rows.entry(DEFAULT_PROJECT.to_string()).or_insert_with(|| {
        ProjectSummary::empty(DEFAULT_PROJECT, "デフォルト", "プロジェクト未割り当てのタスク")
    });

    for t in tasks {
        let row = rows
            .entry(t.project.clone())
            .or_insert_with(|| ProjectSummary::empty(&t.project, &t.project, "未定義プロジェクト"));
        row.total += 1;
        if t.status == TaskStatus::Done {
            row.done += 1;
        }
    }

    rows.into_values()
        .map(|mut r| {
            r.progress = if r.total == 0 {
                0
            } else {
                (r.done * 100 / r.total) as u32
            };
            r
        })
        .collect()
}
