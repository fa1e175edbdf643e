//! Deterministic score model.
//!
//! score = Σ tag weights  +  priority-hint bonus  +  day-state adjustments
//!
//! State adjustments are small, independent nudges; they never override what
//! the tags and hint already say about a task.

use std::collections::HashMap;

use crate::priority::apply_priority_hint;
use crate::state::DayState;
use crate::task::Task;

/// tag key -> weight, built once per ranking pass from the tag master.
pub type TagWeights = HashMap<String, i64>;

pub const LOW_FOCUS_MAX: i64 = 2;
pub const LOW_FOCUS_HEAVY_PENALTY: i64 = -20;
pub const STAY_IN_PENALTY: i64 = -15;
pub const PREFER_AXIS_BONUS: i64 = 10;
pub const AVOID_AXIS_PENALTY: i64 = -10;

const OUTSIDE_TAGS: [&str; 3] = ["outside", "shopping", "errand"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub base_score: i64,
    pub score: i64,
}

/// Sum of tag weights; unknown tags weigh 0. Saturates instead of overflowing.
pub fn compute_base_score(task: &Task, tag_weights: &TagWeights) -> i64 {
    task.tags
        .iter()
        .map(|t| tag_weights.get(t).copied().unwrap_or(0))
        .fold(0, i64::saturating_add)
}

pub fn adjust_score_by_state(score: i64, task: &Task, state: &DayState) -> i64 {
    let tags = &task.tags;
    let mut bonus = 0;

    if state.focus_level.is_some_and(|f| f <= LOW_FOCUS_MAX) && task.has_tag("heavy") {
        bonus += LOW_FOCUS_HEAVY_PENALTY;
    }

    if state.can_go_out == Some(false) && tags.iter().any(|t| OUTSIDE_TAGS.contains(&t.as_str())) {
        bonus += STAY_IN_PENALTY;
    }

    if any_tag_contains(tags, &state.prefer_axes) {
        bonus += PREFER_AXIS_BONUS;
    }
    if any_tag_contains(tags, &state.avoid_axes) {
        bonus += AVOID_AXIS_PENALTY;
    }

    score.saturating_add(bonus)
}

// e.g. axis "study" matches tag "study_programming"
fn any_tag_contains(tags: &[String], axes: &[String]) -> bool {
    axes.iter()
        .any(|ax| tags.iter().any(|tag| tag.contains(ax.as_str())))
}

pub fn score_task(task: &Task, tag_weights: &TagWeights, state: &DayState) -> ScoreBreakdown {
    let base_score = compute_base_score(task, tag_weights);
    let hinted = apply_priority_hint(base_score, task.priority_hint.as_deref());
    ScoreBreakdown {
        base_score,
        score: adjust_score_by_state(hinted, task, state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn weights() -> TagWeights {
        [("job_search", 30), ("heavy", 5), ("coding", 10), ("cleaning", -5)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[test]
    fn base_score_sums_known_tags() {
        let t = Task::new(1, "x").with_tags(["job_search", "coding", "unknown"]);
        assert_eq!(compute_base_score(&t, &weights()), 40);
        assert_eq!(compute_base_score(&Task::new(2, "y"), &weights()), 0);
    }

    #[test]
    fn base_score_is_order_independent() {
        let w = weights();
        let tags = ["job_search", "heavy", "coding", "cleaning", "heavy"];
        let forward = Task::new(1, "x").with_tags(tags);
        let mut rev = tags;
        rev.reverse();
        let backward = Task::new(1, "x").with_tags(rev);
        let rotated = Task::new(1, "x").with_tags(["coding", "heavy", "cleaning", "heavy", "job_search"]);

        let expected = compute_base_score(&forward, &w);
        assert_eq!(compute_base_score(&backward, &w), expected);
        assert_eq!(compute_base_score(&rotated, &w), expected);
    }

    #[test]
    fn low_focus_penalizes_heavy() {
        let st = DayState::from_value(&json!({"meta": {"focus_level": 2}}));
        let heavy = Task::new(1, "x").with_tags(["heavy"]);
        let light = Task::new(2, "y").with_tags(["light"]);
        assert_eq!(adjust_score_by_state(0, &heavy, &st), -20);
        assert_eq!(adjust_score_by_state(0, &light, &st), 0);

        let focused = DayState::from_value(&json!({"meta": {"focus_level": 3}}));
        assert_eq!(adjust_score_by_state(0, &heavy, &focused), 0);
    }

    #[test]
    fn stay_in_penalizes_outside_once() {
        let st = DayState::from_value(&json!({"constraints": {"can_go_out": false}}));
        let t = Task::new(1, "x").with_tags(["shopping", "errand"]);
        assert_eq!(adjust_score_by_state(5, &t, &st), -10);

        let unknown = DayState::from_value(&json!({"constraints": {}}));
        assert_eq!(adjust_score_by_state(5, &t, &unknown), 5);
    }

    #[test]
    fn axes_match_by_substring() {
        let st = DayState::from_value(&json!({
            "focus_plan": {"prefer_axes": ["study"], "avoid_axes": ["game"]}
        }));
        let study = Task::new(1, "x").with_tags(["study_programming"]);
        let game = Task::new(2, "y").with_tags(["strategy_game"]);
        let both = Task::new(3, "z").with_tags(["study_math", "novel_game"]);
        assert_eq!(adjust_score_by_state(0, &study, &st), 10);
        assert_eq!(adjust_score_by_state(0, &game, &st), -10);
        assert_eq!(adjust_score_by_state(0, &both, &st), 0);
    }

    #[test]
    fn adjustments_stack() {
        let st = DayState::from_value(&json!({
            "meta": {"focus_level": "1"},
            "constraints": {"can_go_out": false},
            "focus_plan": {"prefer_axes": ["out"], "avoid_axes": []}
        }));
        let t = Task::new(1, "x").with_tags(["heavy", "outside"]);
        assert_eq!(adjust_score_by_state(100, &t, &st), 100 - 20 - 15 + 10);
    }

    #[test]
    fn malformed_state_means_no_adjustment() {
        let st = DayState::from_value(&json!({"meta": 1, "constraints": null, "focus_plan": "x"}));
        let t = Task::new(1, "x").with_tags(["heavy", "outside"]);
        assert_eq!(adjust_score_by_state(42, &t, &st), 42);
    }

    #[test]
    fn score_task_combines_all_three() {
        let st = DayState::from_value(&json!({"meta": {"focus_level": 1}}));
        let t = Task::new(1, "x")
            .with_tags(["job_search", "heavy"])
            .with_priority_hint("High");
        let b = score_task(&t, &weights(), &st);
        assert_eq!(b.base_score, 35);
        assert_eq!(b.score, 35 + 20 - 20);
    }

    #[test]
    fn extreme_weights_saturate() {
        let mut w = TagWeights::new();
        w.insert("a".into(), i64::MAX);
        w.insert("b".into(), 1);
        w.insert("c".into(), i64::MIN);
        w.insert("d".into(), -1);

        let up = Task::new(1, "x").with_tags(["a", "b"]).with_priority_hint("critical");
        let b = score_task(&up, &w, &DayState::default());
        assert_eq!(b.base_score, i64::MAX);
        assert_eq!(b.score, i64::MAX);

        let down = Task::new(2, "y").with_tags(["c", "d", "heavy"]).with_priority_hint("someday");
        let st = DayState::from_value(&json!({"meta": {"focus_level": 0}}));
        let b = score_task(&down, &w, &st);
        assert_eq!(b.base_score, i64::MIN);
        assert_eq!(b.score, i64::MIN);
    }
}
