//! daybook-core: task model, score model and the priority-ranking pipeline.
//!
//! No I/O lives here. Persistence is `daybook-store`; the HTTP client for the
//! remote model is wired in by the CLI through the traits in [`remote`].

pub mod json_text;
pub mod pipeline;
pub mod priority;
pub mod project;
pub mod ranking;
pub mod remote;
pub mod score;
pub mod state;
pub mod tagging;
pub mod task;

#[cfg(test)]
mod testing;

pub use json_text::{JsonTextError, extract_json_object};
pub use pipeline::{
    AnnotatedTask, DEFAULT_TOP_N, PriorityPipeline, Recommendation, ScoringContext, days_left,
    score_todo,
};
pub use priority::{PriorityHint, apply_priority_hint};
pub use project::{ProjectInfo, ProjectMap, ProjectSummary, summarize_projects};
pub use ranking::{
    MAX_RANKED, RankFailure, RankedItem, RemoteRanker, fallback_rank, fallback_rank_because,
    order_by_score, parse_ranking_response,
};
pub use remote::{RankRequest, RankingService, ServiceError, TagRequest, TaggingService};
pub use score::{ScoreBreakdown, TagWeights, adjust_score_by_state, compute_base_score, score_task};
pub use state::{DayState, StateMap, normalize_state};
pub use tagging::{RemoteTagger, default_tag_candidates};
pub use task::{DEFAULT_PROJECT, Task, TaskStatus};
