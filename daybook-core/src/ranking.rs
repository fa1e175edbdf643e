//! Ranking: the remote ranker adapter and its deterministic fallback.
//!
//! Tiers, in order:
//! 1. 0-2 todo tasks: returned as-is, no remote call.
//! 2. 3 todo tasks: local score order, no remote call.
//! 3. otherwise: ask the remote ranker, validate what comes back.
//! 4. any failure in 3 (transport, timeout, junk, nothing usable): local
//!    score order, top 5, with a reason naming why.
//!
//! The remote tier never surfaces an error to the caller.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::json_text::{JsonTextError, extract_json_object};
use crate::remote::{RANKING_INSTRUCTIONS, RankRequest, RankingService, ServiceError};
use crate::state::normalize_state;
use crate::task::{Task, value_to_text};

pub const MAX_RANKED: usize = 5;

/// Upper bound on todo tasks answered without asking the remote ranker.
pub const PASSTHROUGH_MAX: usize = 2;
pub const LOCAL_ONLY_MAX: usize = 3;

pub const FEW_TASKS_REASON: &str = "件数が少ないため、そのまま候補にします";
pub const FEW_TASKS_LOCAL_REASON: &str = "件数が少ないため、ローカル優先度で提示します";
pub const FALLBACK_REASON: &str = "ローカル優先度で提示します";
pub const SERVICE_FAILED_REASON: &str = "通信/解析に失敗したためローカル優先度で提示します";
pub const EMPTY_ORDER_REASON: &str = "AIが候補を絞れなかったためローカル優先度で提示します";
pub const NOTHING_VALID_REASON: &str = "出力が不安定だったためローカル優先度で提示します";
pub const OFFLINE_REASON: &str = "リモート順位付けが無効のためローカル優先度で提示します";
/// Stands in for an empty reason from the remote ranker.
pub const MISSING_REASON: &str = "理由の記載はありません";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedItem {
    pub id: i64,
    pub reason: String,
}

impl RankedItem {
    pub fn new(id: i64, reason: impl Into<String>) -> Self {
        Self {
            id,
            reason: reason.into(),
        }
    }
}

/// Why the remote tier was abandoned.
#[derive(Debug, Error)]
pub enum RankFailure {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("unparseable ranking response: {0}")]
    Unparseable(#[from] JsonTextError),

    #[error("ranking response had no ordered_tasks")]
    EmptyOrdered,

    #[error("no ordered_tasks entry referenced a todo task")]
    NothingValid,

    #[error("remote ranking is disabled")]
    Offline,
}

impl RankFailure {
    pub fn fallback_reason(&self) -> &'static str {
        match self {
            Self::Service(_) | Self::Unparseable(_) => SERVICE_FAILED_REASON,
            Self::EmptyOrdered => EMPTY_ORDER_REASON,
            Self::NothingValid => NOTHING_VALID_REASON,
            Self::Offline => OFFLINE_REASON,
        }
    }
}

/// Descending score; unscored tasks last. Ties keep input order.
pub fn order_by_score(tasks: &[Task]) -> Vec<&Task> {
    let mut sorted: Vec<&Task> = tasks.iter().collect();
    sorted.sort_by(|a, b| score_desc(a.score, b.score));
    sorted
}

fn score_desc(a: Option<i64>, b: Option<i64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn fallback_rank(todo: &[Task]) -> Vec<RankedItem> {
    ranked_by_score(todo, FALLBACK_REASON)
}

pub fn fallback_rank_because(todo: &[Task], failure: &RankFailure) -> Vec<RankedItem> {
    ranked_by_score(todo, failure.fallback_reason())
}

fn ranked_by_score(todo: &[Task], reason: &str) -> Vec<RankedItem> {
    order_by_score(todo)
        .into_iter()
        .take(MAX_RANKED)
        .map(|t| RankedItem::new(t.id, reason))
        .collect()
}

/// Validate a ranking response against the todo set.
///
/// Items without a usable integer id, or naming a task outside `todo`, are
/// dropped. Repeated ids keep their first occurrence. At most [`MAX_RANKED`].
pub fn parse_ranking_response(text: &str, todo: &[Task]) -> Result<Vec<RankedItem>, RankFailure> {
    let obj = extract_json_object(text)?;
    let ordered = match obj.get("ordered_tasks") {
        Some(Value::Array(items)) if !items.is_empty() => items,
        _ => return Err(RankFailure::EmptyOrdered),
    };

    let valid: HashSet<i64> = todo.iter().map(|t| t.id).collect();
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for item in ordered {
        let Some(fields) = item.as_object() else { continue };
        let Some(id) = fields.get("id").and_then(coerce_id) else { continue };
        if !valid.contains(&id) || !seen.insert(id) {
            continue;
        }

        let reason = match fields.get("reason") {
            None | Some(Value::Null) => String::new(),
            Some(v) => value_to_text(v).trim().to_string(),
        };
        let reason = if reason.is_empty() {
            MISSING_REASON.to_string()
        } else {
            reason
        };

        out.push(RankedItem { id, reason });
        if out.len() == MAX_RANKED {
            break;
        }
    }

    if out.is_empty() {
        return Err(RankFailure::NothingValid);
    }
    Ok(out)
}

/// Integer, integral float, or a string holding an integer.
fn coerce_id(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Remote ranker adapter. Holds an injected service handle; `offline()` has
/// none and always takes the local path.
#[derive(Clone, Copy)]
pub struct RemoteRanker<'a> {
    service: Option<&'a dyn RankingService>,
}

impl<'a> RemoteRanker<'a> {
    pub fn new(service: &'a dyn RankingService) -> Self {
        Self {
            service: Some(service),
        }
    }

    pub fn offline() -> Self {
        Self { service: None }
    }

    pub fn is_offline(&self) -> bool {
        self.service.is_none()
    }

    /// Rank todo tasks. Always returns a usable list (empty only for empty input).
    pub fn rank(&self, todo: &[Task], state: &Value) -> Vec<RankedItem> {
        if todo.len() <= PASSTHROUGH_MAX {
            return todo
                .iter()
                .map(|t| RankedItem::new(t.id, FEW_TASKS_REASON))
                .collect();
        }
        if todo.len() <= LOCAL_ONLY_MAX {
            return order_by_score(todo)
                .into_iter()
                .map(|t| RankedItem::new(t.id, FEW_TASKS_LOCAL_REASON))
                .collect();
        }

        match self.try_remote(todo, state) {
            Ok(items) => items,
            Err(RankFailure::Offline) => {
                info!("remote ranking disabled; using local score order");
                fallback_rank_because(todo, &RankFailure::Offline)
            }
            Err(failure) => {
                warn!(error = %failure, "remote ranking failed; using local score order");
                fallback_rank_because(todo, &failure)
            }
        }
    }

    /// The remote tier on its own, without shortcuts or fallback.
    pub fn try_remote(&self, todo: &[Task], state: &Value) -> Result<Vec<RankedItem>, RankFailure> {
        let service = self.service.ok_or(RankFailure::Offline)?;

        let request = RankRequest {
            system_instructions: RANKING_INSTRUCTIONS.to_string(),
            state: normalize_state(state),
            tasks: todo.to_vec(),
        };
        debug!(todo = todo.len(), "requesting remote ranking");

        let text = service.rank(&request)?;
        let items = parse_ranking_response(&text, todo)?;
        debug!(ranked = items.len(), "remote ranking accepted");
        Ok(items)
    }
}
