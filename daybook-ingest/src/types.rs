use daybook_core::{JsonTextError, StateMap, extract_json_object};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("journal is not a JSON object")]
    NotAnObject,

    #[error("journal is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no journal object found in text: {0}")]
    Text(#[from] JsonTextError),
}

/// Fields copied verbatim from a journal into the state snapshot.
pub const SNAPSHOT_FIELDS: [&str; 5] = [
    "meta",
    "constraints",
    "focus_plan",
    "tomorrow_suggestions",
    "free_note",
];

/// A daily journal document.
///
/// Kept as a raw object: only `date`, the snapshot fields and `new_tasks`
/// are read, everything else is ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct Journal {
    raw: StateMap,
}

/// One `new_tasks` entry that passed shape checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTaskEntry {
    pub text: String,
    pub project: Option<String>,
    pub due_date: Option<String>,
    pub tags_hint: Vec<String>,
    pub priority_hint: Option<String>,
}

impl Journal {
    pub fn from_value(value: Value) -> Result<Self, JournalError> {
        match value {
            Value::Object(raw) => Ok(Self { raw }),
            _ => Err(JournalError::NotAnObject),
        }
    }

    /// Strict JSON, as read from a journal file.
    pub fn from_json(text: &str) -> Result<Self, JournalError> {
        Self::from_value(serde_json::from_str(text)?)
    }

    /// Pasted model output: code fences and surrounding prose are tolerated.
    pub fn from_pasted(text: &str) -> Result<Self, JournalError> {
        Ok(Self {
            raw: extract_json_object(text)?,
        })
    }

    pub fn date(&self) -> Option<&Value> {
        self.raw.get("date")
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.raw.get(field)
    }

    /// `None` when `new_tasks` is present but not an array.
    pub fn new_task_entries(&self) -> Option<Vec<NewTaskEntry>> {
        match self.raw.get("new_tasks") {
            None | Some(Value::Null) => Some(Vec::new()),
            Some(Value::Array(items)) => Some(items.iter().filter_map(NewTaskEntry::from_value).collect()),
            Some(_) => None,
        }
    }
}

impl NewTaskEntry {
    fn from_value(v: &Value) -> Option<Self> {
        let text = non_empty(v.get("text"))?;
        let tags_hint = match v.get("tags_hint") {
            Some(Value::Array(tags)) => tags
                .iter()
                .filter_map(|t| match t {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };
        Some(Self {
            text,
            project: non_empty(v.get("project")),
            due_date: non_empty(v.get("due_date")),
            tags_hint,
            priority_hint: non_empty(v.get("priority_hint")),
        })
    }
}

fn non_empty(v: Option<&Value>) -> Option<String> {
    v.and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
