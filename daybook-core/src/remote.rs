//! Contracts for the externally-hosted ranking and tagging services.
//!
//! The core never talks HTTP. Whoever owns the process builds a client that
//! implements these traits (with its own timeout) and hands it to
//! [`crate::ranking::RemoteRanker`] / [`crate::tagging::RemoteTagger`].
//! Implementations return the model's raw text; parsing and validation stay
//! here so every client gets the same degradation rules.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::state::StateMap;
use crate::task::Task;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("remote call timed out after {0:?}")]
    Timeout(Duration),

    #[error("remote transport error: {0}")]
    Transport(String),

    #[error("remote service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("remote service not configured")]
    Unavailable,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankRequest {
    pub system_instructions: String,
    pub state: StateMap,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TagRequest {
    pub title: String,
    pub detail: String,
    pub candidate_tags: Vec<String>,
}

pub trait RankingService {
    /// Expected to answer with a JSON object carrying `ordered_tasks`.
    fn rank(&self, request: &RankRequest) -> Result<String, ServiceError>;
}

pub trait TaggingService {
    /// Expected to answer with a JSON object carrying `tags`.
    fn suggest_tags(&self, request: &TagRequest) -> Result<String, ServiceError>;
}

pub const RANKING_INSTRUCTIONS: &str = r#"You are a task-prioritisation assistant.

Goal:
- Understand the user's state for today (state).
- Only keep tasks that are realistically doable in that state.
- Rank by tags, deadlines (days_left) and physical/mental load.
- Return at most 5 tasks for today, as JSON.

Input:
- state: today's state. Keys include can_sit_at_desk, can_go_outside,
  physical_energy, mental_energy, creative_drive, money_pressure_creative,
  study_deadline_days.
- tasks: todo tasks with id, text, project, tags, due_date, days_left, score.
  score is a local heuristic; use it as a tie-breaker, not a verdict.

Tag meanings (important ones):
- job_search: applications and interview prep. Most urgent category.
- career_research: industry and company research.
- study_*: study and exam preparation.
- creative_paid_short: short paid creative work (covers living costs).
- creative_paid_long: long-running paid creative project.
- creative_portfolio: portfolio pieces.
- cleaning / room_setup / admin: lighter everyday chores.
- light / medium / heavy: physical load.
- start: an easy first step.

Rules:
1. Exclude what cannot be done today.
   - can_sit_at_desk = false: drop heavy desk work.
   - can_go_outside = false: drop tasks that require going out.
   - physical_energy and mental_energy both low: drop heavy, push medium down.
2. Obligations first.
   - job_search goes to the top unless the state makes it impossible.
   - study_deadline_days <= 2: strongly prefer study_* (avoid very heavy ones).
3. Money pressure.
   - money_pressure_creative = "high": raise creative_paid_short.
   - creative_paid_long only when physical_energy is medium or better.
   - creative_portfolio can wait unless the day has slack.
4. Energy.
   - physical_energy = "low": avoid heavy, prefer light.
   - mental_energy = "low": lower design / writing / coding / fix.
   - creative_drive = "high": one light creative_* warm-up is fine, but never
     push out job_search or an imminent study_* task.
5. Ease of starting: between similar tasks prefer light / cleaning / admin / start.

Output: a single JSON object and nothing else:
{"ordered_tasks": [{"id": <task id as a number>, "reason": "<one or two sentences>"}]}

Constraints:
- Only tasks with status "todo".
- Use the input ids verbatim.
- At most 5 entries.
- If only one task qualifies, still return it."#;

pub const TAGGING_INSTRUCTIONS: &str = r#"You classify personal tasks.

Pick 0 to 3 tags for the task, only from the candidate list. Judge relevance in
the order category, nature, then load. Never invent tags. When unsure, keep the
most important ones.

Output a single JSON object and nothing else:
{"tags": ["tag1", "tag2"]}"#;
