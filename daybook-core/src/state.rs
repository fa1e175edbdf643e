//! The day's state snapshot.
//!
//! State arrives as loosely-typed JSON from a journal import. It stays a JSON
//! object at the boundary (it is forwarded to the remote ranker as-is), and
//! scoring only ever reads it through [`DayState`], whose accessors coerce or
//! default every field instead of trusting the shape.

use serde_json::{Map, Value};

pub type StateMap = Map<String, Value>;

/// Typed view of the fields the score model reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayState {
    pub focus_level: Option<i64>,
    /// Only an explicit JSON `false`/`true` counts.
    pub can_go_out: Option<bool>,
    pub prefer_axes: Vec<String>,
    pub avoid_axes: Vec<String>,
}

impl DayState {
    pub fn from_value(state: &Value) -> Self {
        let focus_level = section(state, "meta")
            .and_then(|m| m.get("focus_level"))
            .and_then(coerce_int);

        let can_go_out = section(state, "constraints")
            .and_then(|c| c.get("can_go_out"))
            .and_then(Value::as_bool);

        let plan = section(state, "focus_plan");
        let prefer_axes = string_list(plan.and_then(|p| p.get("prefer_axes")));
        let avoid_axes = string_list(plan.and_then(|p| p.get("avoid_axes")));

        Self {
            focus_level,
            can_go_out,
            prefer_axes,
            avoid_axes,
        }
    }

    pub fn from_map(state: &StateMap) -> Self {
        Self::from_value(&Value::Object(state.clone()))
    }
}

fn section<'a>(state: &'a Value, key: &str) -> Option<&'a Map<String, Value>> {
    state.get(key).and_then(Value::as_object)
}

/// Integer, float (truncated toward zero) or a string holding an integer.
fn coerce_int(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn string_list(v: Option<&Value>) -> Vec<String> {
    match v {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|i| i.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

const LOW_ENERGY_BUDGETS: [&str; 2] = ["short", "tiny"];

/// Fill ranker-facing fields that are absent, never overwriting present ones.
///
/// An incomplete state otherwise reads to the remote model as "nothing is
/// possible today" and it returns zero candidates.
pub fn normalize_state(state: &Value) -> StateMap {
    let mut s = state.as_object().cloned().unwrap_or_default();

    let low_budget = s
        .get("energy_budget")
        .and_then(Value::as_str)
        .is_some_and(|b| LOW_ENERGY_BUDGETS.contains(&b));
    let energy = if low_budget { "low" } else { "medium" };

    for key in ["physical_energy", "mental_energy"] {
        s.entry(key).or_insert_with(|| Value::from(energy));
    }
    s.entry("can_sit_at_desk").or_insert(Value::Bool(true));
    s.entry("can_go_outside").or_insert(Value::Bool(true));
    s.entry("creative_drive").or_insert_with(|| Value::from("medium"));
    s.entry("money_pressure_creative").or_insert_with(|| Value::from("low"));
    s.entry("study_deadline_days").or_insert_with(|| Value::from(999));

    s
}
