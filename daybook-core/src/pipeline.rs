//! Priority pipeline: todo filter -> days_left -> scores -> ranker -> output.
//!
//! Everything here is pure given its inputs; "today" is passed in.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::project::ProjectMap;
use crate::ranking::{RemoteRanker, order_by_score};
use crate::score::{TagWeights, score_task};
use crate::state::DayState;
use crate::task::{Task, TaskStatus};

pub const DEFAULT_TOP_N: usize = 10;
pub const SCORE_ORDER_REASON: &str = "スコア順";

/// Per-pass lookup tables.
#[derive(Debug, Clone, Default)]
pub struct ScoringContext {
    pub tag_weights: TagWeights,
    pub projects: ProjectMap,
}

/// A ranked task as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub id: i64,
    pub text: String,
    pub project: String,
    pub status: TaskStatus,
    pub tags: Vec<String>,
    pub due_date: Option<String>,
    pub days_left: Option<i64>,
    pub score: Option<i64>,
    pub reason: String,
}

impl Recommendation {
    fn from_task(task: &Task, reason: &str) -> Self {
        Self {
            id: task.id,
            text: task.text.clone(),
            project: task.project.clone(),
            status: task.status,
            tags: task.tags.clone(),
            due_date: task.due_date.clone(),
            days_left: task.days_left,
            score: task.score,
            reason: reason.to_string(),
        }
    }
}

/// Any task, with the ranker's reason if it was recommended (else empty).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedTask {
    #[serde(flatten)]
    pub task: Task,
    pub reason: String,
}

/// Days from `today` to the task's due date, or its project's default.
/// Unparseable dates count as no date.
pub fn days_left(task: &Task, projects: &ProjectMap, today: NaiveDate) -> Option<i64> {
    let due = non_empty(task.due_date.as_deref()).or_else(|| {
        projects
            .get(&task.project)
            .and_then(|p| non_empty(p.default_due_date.as_deref()))
    })?;
    let date: NaiveDate = due.trim().parse().ok()?;
    Some((date - today).num_days())
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}

/// Todo tasks with `days_left`, `base_score` and `score` filled in.
pub fn score_todo(tasks: &[Task], ctx: &ScoringContext, state: &Value, today: NaiveDate) -> Vec<Task> {
    let day = DayState::from_value(state);
    tasks
        .iter()
        .filter(|t| t.is_todo())
        .map(|t| {
            let mut t = t.clone();
            t.days_left = days_left(&t, &ctx.projects, today);
            let s = score_task(&t, &ctx.tag_weights, &day);
            t.base_score = Some(s.base_score);
            t.score = Some(s.score);
            t
        })
        .collect()
}

pub struct PriorityPipeline<'a> {
    ranker: RemoteRanker<'a>,
    top_n: usize,
}

impl<'a> PriorityPipeline<'a> {
    pub fn new(ranker: RemoteRanker<'a>) -> Self {
        Self {
            ranker,
            top_n: DEFAULT_TOP_N,
        }
    }

    /// Size of the plain score-order list used when the ranker yields nothing.
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn recommend(
        &self,
        tasks: &[Task],
        ctx: &ScoringContext,
        state: &Value,
        today: NaiveDate,
    ) -> Vec<Recommendation> {
        let todo = score_todo(tasks, ctx, state, today);
        let ordered = self.ranker.rank(&todo, state);

        if ordered.is_empty() {
            info!(todo = todo.len(), "ranker returned nothing; listing by score");
            return order_by_score(&todo)
                .into_iter()
                .take(self.top_n)
                .map(|t| Recommendation::from_task(t, SCORE_ORDER_REASON))
                .collect();
        }

        let by_id: HashMap<i64, &Task> = todo.iter().map(|t| (t.id, t)).collect();
        ordered
            .iter()
            .filter_map(|item| {
                by_id
                    .get(&item.id)
                    .map(|t| Recommendation::from_task(t, &item.reason))
            })
            .collect()
    }

    /// Every task in input order; todo tasks scored, recommended ones with a reason.
    pub fn annotate_all(
        &self,
        tasks: &[Task],
        ctx: &ScoringContext,
        state: &Value,
        today: NaiveDate,
    ) -> Vec<AnnotatedTask> {
        let todo = score_todo(tasks, ctx, state, today);
        let reasons: HashMap<i64, String> = self
            .ranker
            .rank(&todo, state)
            .into_iter()
            .map(|item| (item.id, item.reason))
            .collect();
        let mut scored: HashMap<i64, Task> = todo.into_iter().map(|t| (t.id, t)).collect();

        tasks
            .iter()
            .map(|t| {
                let mut task = match t.status {
                    TaskStatus::Todo => scored.remove(&t.id).unwrap_or_else(|| t.clone()),
                    TaskStatus::Done => t.clone(),
                };
                // `reason` is flattened beside the task; a stored one would serialize twice.
                task.extra.remove("reason");
                let reason = match task.status {
                    TaskStatus::Todo => reasons.get(&task.id).cloned().unwrap_or_default(),
                    TaskStatus::Done => String::new(),
                };
                AnnotatedTask { task, reason }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::ProjectInfo;
    use crate::ranking::{FEW_TASKS_REASON, SERVICE_FAILED_REASON};
    use crate::remote::ServiceError;
    use crate::testing::FakeRanker;
    use serde_json::json;
    use std::time::Duration;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ctx() -> ScoringContext {
        let mut c = ScoringContext::default();
        c.tag_weights.insert("heavy".into(), 15);
        c.tag_weights.insert("job_search".into(), 30);
        c.tag_weights.insert("admin".into(), 5);
        c.projects.insert(
            "thesis".into(),
            ProjectInfo {
                default_due_date: Some("2025-02-01".into()),
                ..ProjectInfo::default()
            },
        );
        c
    }

    #[test]
    fn days_left_from_task_then_project() {
        let c = ctx();
        let today = day(2025, 1, 10);

        let own = Task::new(1, "x").with_due_date("2025-01-01").with_project("thesis");
        assert_eq!(days_left(&own, &c.projects, today), Some(-9));

        let inherited = Task::new(2, "y").with_project("thesis");
        assert_eq!(days_left(&inherited, &c.projects, today), Some(22));

        let empty_due = Task::new(3, "z").with_due_date("").with_project("thesis");
        assert_eq!(days_left(&empty_due, &c.projects, today), Some(22));

        assert_eq!(days_left(&Task::new(4, "w"), &c.projects, today), None);

        let bad = Task::new(5, "v").with_due_date("next friday");
        assert_eq!(days_left(&bad, &c.projects, today), None);
    }

    #[test]
    fn heavy_task_on_low_focus_day() {
        let c = ctx();
        let tasks = vec![Task::new(1, "move furniture").with_tags(["heavy"])];
        let state = json!({"meta": {"focus_level": 1}});

        let scored = score_todo(&tasks, &c, &state, day(2025, 1, 10));
        assert_eq!(scored[0].base_score, Some(15));
        assert_eq!(scored[0].score, Some(15 - 20));

        let fake = FakeRanker::replying("{}");
        let out = PriorityPipeline::new(RemoteRanker::new(&fake)).recommend(
            &tasks,
            &c,
            &state,
            day(2025, 1, 10),
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, 1);
        assert_eq!(out[0].reason, FEW_TASKS_REASON);
        assert_eq!(out[0].score, Some(-5));
        assert_eq!(fake.calls(), 0);
    }

    #[test]
    fn done_tasks_are_never_ranked() {
        let mut done = Task::new(1, "done already").with_tags(["job_search"]);
        done.complete("2025-01-09T10:00:00");
        let tasks = vec![done, Task::new(2, "open")];

        let out = PriorityPipeline::new(RemoteRanker::offline()).recommend(
            &tasks,
            &ctx(),
            &json!({}),
            day(2025, 1, 10),
        );
        assert_eq!(out.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn remote_timeout_yields_fallback_order() {
        let tasks = vec![
            Task::new(1, "a").with_tags(["admin"]),
            Task::new(2, "b").with_tags(["job_search"]),
            Task::new(3, "c"),
            Task::new(4, "d").with_tags(["job_search"]),
            Task::new(5, "e").with_tags(["admin"]).with_priority_hint("critical"),
        ];
        let fake = FakeRanker::failing(|| ServiceError::Timeout(Duration::from_secs(30)));
        let out = PriorityPipeline::new(RemoteRanker::new(&fake)).recommend(
            &tasks,
            &ctx(),
            &json!({}),
            day(2025, 1, 10),
        );

        // scores: 5, 30, 0, 30, 45
        assert_eq!(out.iter().map(|r| r.id).collect::<Vec<_>>(), vec![5, 2, 4, 1, 3]);
        assert!(out.iter().all(|r| r.reason == SERVICE_FAILED_REASON));
        assert_eq!(fake.calls(), 1);
    }

    #[test]
    fn remote_reasons_flow_into_output() {
        let tasks: Vec<Task> = (1..=4).map(|i| Task::new(i, format!("t{i}"))).collect();
        let fake = FakeRanker::replying(
            r#"{"ordered_tasks": [{"id": 3, "reason": "due soon"}, {"id": 1, "reason": "quick win"}]}"#,
        );
        let out = PriorityPipeline::new(RemoteRanker::new(&fake)).recommend(
            &tasks,
            &ctx(),
            &json!({}),
            day(2025, 1, 10),
        );
        assert_eq!(out.len(), 2);
        assert_eq!((out[0].id, out[0].reason.as_str()), (3, "due soon"));
        assert_eq!(out[0].text, "t3");
        assert_eq!((out[1].id, out[1].reason.as_str()), (1, "quick win"));
    }

    #[test]
    fn empty_task_list_gives_empty_output() {
        let out = PriorityPipeline::new(RemoteRanker::offline())
            .with_top_n(3)
            .recommend(&[], &ctx(), &json!({}), day(2025, 1, 10));
        assert!(out.is_empty());
    }

    #[test]
    fn annotate_all_keeps_every_task() {
        let mut done = Task::new(2, "finished");
        done.complete("2025-01-09T10:00:00");
        let tasks = vec![Task::new(1, "open").with_tags(["admin"]), done];

        let out = PriorityPipeline::new(RemoteRanker::offline()).annotate_all(
            &tasks,
            &ctx(),
            &json!({}),
            day(2025, 1, 10),
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].task.score, Some(5));
        assert_eq!(out[0].reason, FEW_TASKS_REASON);
        assert_eq!(out[1].task.score, None);
        assert_eq!(out[1].reason, "");
    }

    #[test]
    fn stored_reason_field_is_not_emitted_twice() {
        let open: Task = serde_json::from_value(json!({"id": 1, "text": "a", "reason": "stale"})).unwrap();
        let mut done: Task =
            serde_json::from_value(json!({"id": 2, "text": "b", "reason": "old"})).unwrap();
        done.complete("2025-01-09T10:00:00");

        let out = PriorityPipeline::new(RemoteRanker::offline()).annotate_all(
            &[open, done],
            &ctx(),
            &json!({}),
            day(2025, 1, 10),
        );

        let text = serde_json::to_string(&out[0]).unwrap();
        assert_eq!(text.matches("\"reason\"").count(), 1, "{text}");
        let v: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["reason"], FEW_TASKS_REASON);

        let text = serde_json::to_string(&out[1]).unwrap();
        assert_eq!(text.matches("\"reason\"").count(), 1, "{text}");
        let v: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["reason"], "");
    }
}
