//! Tag suggestions from the remote tagging service.

use serde_json::Value;
use tracing::warn;

use crate::json_text::{JsonTextError, extract_json_object};
use crate::remote::{TagRequest, TaggingService};
use crate::task::value_to_text;

pub const MAX_TAGS: usize = 3;

/// Used when no tag master exists yet.
pub const DEFAULT_TAG_CANDIDATES: [&str; 7] =
    ["job_search", "portfolio", "coding", "admin", "light", "medium", "heavy"];

pub fn default_tag_candidates() -> Vec<String> {
    DEFAULT_TAG_CANDIDATES.iter().map(|s| s.to_string()).collect()
}

#[derive(Clone, Copy)]
pub struct RemoteTagger<'a> {
    service: Option<&'a dyn TaggingService>,
}

impl<'a> RemoteTagger<'a> {
    pub fn new(service: &'a dyn TaggingService) -> Self {
        Self {
            service: Some(service),
        }
    }

    pub fn offline() -> Self {
        Self { service: None }
    }

    /// Up to [`MAX_TAGS`] tags from `candidates`. Failures yield no tags.
    pub fn suggest(&self, title: &str, detail: &str, candidates: &[String]) -> Vec<String> {
        let Some(service) = self.service else {
            return Vec::new();
        };

        let request = TagRequest {
            title: title.to_string(),
            detail: detail.to_string(),
            candidate_tags: candidates.to_vec(),
        };

        let text = match service.suggest_tags(&request) {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "tag suggestion failed; adding task without tags");
                return Vec::new();
            }
        };

        match parse_tag_response(&text, candidates) {
            Ok(tags) => tags,
            Err(e) => {
                warn!(error = %e, response = %text, "tag suggestion was not JSON");
                Vec::new()
            }
        }
    }
}

/// Keep proposed tags that are in `candidates`, first occurrence, at most 3.
pub fn parse_tag_response(text: &str, candidates: &[String]) -> Result<Vec<String>, JsonTextError> {
    let obj = extract_json_object(text)?;
    let proposed: Vec<String> = match obj.get("tags") {
        Some(Value::Array(items)) => items.iter().map(value_to_text).collect(),
        _ => Vec::new(),
    };

    let mut tags: Vec<String> = Vec::new();
    let mut rejected: Vec<String> = Vec::new();
    for tag in proposed {
        if !candidates.contains(&tag) {
            rejected.push(tag);
        } else if !tags.contains(&tag) {
            tags.push(tag);
        }
    }

    if !rejected.is_empty() {
        warn!(?rejected, "tagger proposed tags outside the candidate list");
    }

    tags.truncate(MAX_TAGS);
    Ok(tags)
}
