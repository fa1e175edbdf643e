//! Task model for the flat-file task log.
//!
//! One `Task` is one line of `tasks.jsonl`. Persisted fields are decoded
//! leniently where the log has historically been hand-edited (tags, hints);
//! the derived fields (`base_score`, `days_left`, `score`) are recomputed on
//! every ranking pass and only serialized so they can be shown to the remote
//! ranker.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_PROJECT: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Todo,
    /// Terminal.
    Done,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub text: String,

    #[serde(default = "default_project")]
    pub project: String,

    /// Set-like; duplicates are harmless.
    #[serde(default, deserialize_with = "lenient_tags")]
    pub tags: Vec<String>,

    #[serde(default)]
    pub status: TaskStatus,

    /// ISO date (`YYYY-MM-DD`), kept as written.
    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,

    /// Raw hint as supplied; normalized only when scoring.
    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub priority_hint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_score: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_left: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,

    /// Fields this version does not know about, preserved across rewrites.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Task {
    pub fn new(id: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            project: default_project(),
            tags: Vec::new(),
            status: TaskStatus::Todo,
            due_date: None,
            priority_hint: None,
            created_at: None,
            completed_at: None,
            base_score: None,
            days_left: None,
            score: None,
            extra: Map::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = project.into();
        self
    }

    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    pub fn with_priority_hint(mut self, hint: impl Into<String>) -> Self {
        self.priority_hint = Some(hint.into());
        self
    }

    pub fn with_score(mut self, score: i64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = Some(created_at.into());
        self
    }

    pub fn is_todo(&self) -> bool {
        self.status == TaskStatus::Todo
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Mark done. Returns false when the task was already done.
    pub fn complete(&mut self, completed_at: impl Into<String>) -> bool {
        if self.status == TaskStatus::Done {
            return false;
        }
        self.status = TaskStatus::Done;
        self.completed_at = Some(completed_at.into());
        true
    }

    pub fn clear_derived(&mut self) {
        self.base_score = None;
        self.days_left = None;
        self.score = None;
    }
}

fn default_project() -> String {
    DEFAULT_PROJECT.to_string()
}

/// Stringify a JSON scalar the way it reads; strings are taken verbatim.
pub(crate) fn value_to_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn lenient_tags<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(match v {
        Value::Array(items) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(value_to_text)
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(match v {
        Value::Null => None,
        other => Some(value_to_text(&other)),
    })
}
