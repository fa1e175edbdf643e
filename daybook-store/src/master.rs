//! Tag master (`tags_master.json`) and project master (`projects.json`).

use std::fs;
use std::path::{Path, PathBuf};

use daybook_core::{ProjectInfo, ProjectMap, TagWeights, default_tag_candidates};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::StoreError;

#[derive(Debug, Clone)]
pub struct MasterStore {
    tags_path: PathBuf,
    projects_path: PathBuf,
}

impl MasterStore {
    pub fn new(tags_path: impl Into<PathBuf>, projects_path: impl Into<PathBuf>) -> Self {
        Self {
            tags_path: tags_path.into(),
            projects_path: projects_path.into(),
        }
    }

    pub fn load_tag_weights(&self) -> Result<TagWeights, StoreError> {
        Ok(read_json(&self.tags_path)?
            .map(|doc| tag_weights_from(&doc))
            .unwrap_or_default())
    }

    /// Tag keys from the master, or the built-in list when the file is missing.
    pub fn load_tag_candidates(&self) -> Result<Vec<String>, StoreError> {
        match read_json(&self.tags_path)? {
            Some(doc) => Ok(tag_entries(&doc).map(|(key, _)| key.to_string()).collect()),
            None => {
                warn!(path = %self.tags_path.display(), "tag master not found; using default tags");
                Ok(default_tag_candidates())
            }
        }
    }

    pub fn load_projects(&self) -> Result<ProjectMap, StoreError> {
        Ok(read_json(&self.projects_path)?
            .map(|doc| projects_from(&doc))
            .unwrap_or_default())
    }
}

fn read_json(path: &Path) -> Result<Option<Value>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    let doc = serde_json::from_str(&text).map_err(|source| StoreError::InvalidDocument {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "loaded master file");
    Ok(Some(doc))
}

fn tag_entries(doc: &Value) -> impl Iterator<Item = (&str, Option<&Value>)> {
    doc.get("tags")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|entry| {
            let key = entry.get("key")?.as_str().filter(|k| !k.is_empty())?;
            Some((key, entry.get("weight_for_priority")))
        })
}

/// `{"tags": [{"key", "weight_for_priority"}]}` -> key -> weight.
///
/// Missing or non-integer weights count as 0. A top-level `tag_weight_by_key`
/// mapping, when present, overrides individual entries.
pub fn tag_weights_from(doc: &Value) -> TagWeights {
    let mut weights: TagWeights = tag_entries(doc)
        .map(|(key, w)| (key.to_string(), w.and_then(weight).unwrap_or(0)))
        .collect();

    if let Some(overrides) = doc.get("tag_weight_by_key").and_then(Value::as_object) {
        for (key, w) in overrides {
            weights.insert(key.clone(), weight(w).unwrap_or(0));
        }
    }
    weights
}

fn weight(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Accepts `[{"id": .., ...}]` or `{"<id>": {...}}`.
pub fn projects_from(doc: &Value) -> ProjectMap {
    match doc {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| {
                let id = match item.get("id")? {
                    Value::String(s) if !s.is_empty() => s.clone(),
                    Value::Number(n) => n.to_string(),
                    _ => return None,
                };
                Some((id, project_info(item)))
            })
            .collect(),
        Value::Object(map) => map
            .iter()
            .filter(|(_, v)| v.is_object())
            .map(|(id, v)| (id.clone(), project_info(v)))
            .collect(),
        _ => {
            warn!("project master is neither a list nor a mapping; ignoring it");
            ProjectMap::new()
        }
    }
}

fn project_info(v: &Value) -> ProjectInfo {
    let field = |name: &str| v.get(name).and_then(Value::as_str).map(str::to_string);
    ProjectInfo {
        name: field("name"),
        description: field("description"),
        default_due_date: field("default_due_date"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn weights_skip_keyless_and_default_bad_weights() {
        let doc = json!({"tags": [
            {"key": "job_search", "axis": "domain", "label": "就活", "weight_for_priority": 30},
            {"key": "heavy", "weight_for_priority": "15"},
            {"key": "light"},
            {"key": "odd", "weight_for_priority": "lots"},
            {"label": "no key", "weight_for_priority": 99},
            {"key": "", "weight_for_priority": 5},
        ]});
        let w = tag_weights_from(&doc);
        assert_eq!(w.len(), 4);
        assert_eq!(w["job_search"], 30);
        assert_eq!(w["heavy"], 15);
        assert_eq!(w["light"], 0);
        assert_eq!(w["odd"], 0);
    }

    #[test]
    fn weight_overrides_apply() {
        let doc = json!({
            "tags": [{"key": "admin", "weight_for_priority": 5}],
            "tag_weight_by_key": {"admin": 8, "extra": 2}
        });
        let w = tag_weights_from(&doc);
        assert_eq!(w["admin"], 8);
        assert_eq!(w["extra"], 2);
    }

    #[test]
    fn projects_as_list_or_mapping() {
        let list = json!([
            {"id": "thesis", "name": "卒論", "default_due_date": "2025-02-01"},
            {"id": 7, "name": "numbered"},
            {"name": "no id"}
        ]);
        let p = projects_from(&list);
        assert_eq!(p.len(), 2);
        assert_eq!(p["thesis"].default_due_date.as_deref(), Some("2025-02-01"));
        assert_eq!(p["7"].name.as_deref(), Some("numbered"));

        let map = json!({
            "thesis": {"name": "卒論", "description": "final", "default_due_date": "2025-02-01"},
            "junk": 3
        });
        let p = projects_from(&map);
        assert_eq!(p.len(), 1);
        assert_eq!(p["thesis"].description.as_deref(), Some("final"));

        assert!(projects_from(&json!("nope")).is_empty());
    }

    #[test]
    fn missing_files() {
        let dir = TempDir::new().unwrap();
        let store = MasterStore::new(dir.path().join("tags_master.json"), dir.path().join("projects.json"));
        assert!(store.load_tag_weights().unwrap().is_empty());
        assert!(store.load_projects().unwrap().is_empty());
        assert_eq!(store.load_tag_candidates().unwrap(), default_tag_candidates());
    }

    #[test]
    fn candidates_come_from_master_keys() {
        let dir = TempDir::new().unwrap();
        let tags = dir.path().join("tags_master.json");
        fs::write(&tags, r#"{"tags": [{"key": "coding"}, {"key": "writing"}]}"#).unwrap();
        let store = MasterStore::new(&tags, dir.path().join("projects.json"));
        assert_eq!(store.load_tag_candidates().unwrap(), vec!["coding", "writing"]);
    }

    #[test]
    fn broken_master_is_an_error() {
        let dir = TempDir::new().unwrap();
        let projects = dir.path().join("projects.json");
        fs::write(&projects, "{ not json").unwrap();
        let store = MasterStore::new(dir.path().join("tags_master.json"), &projects);
        assert!(matches!(
            store.load_projects(),
            Err(StoreError::InvalidDocument { .. })
        ));
    }
}
