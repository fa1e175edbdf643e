//! Caller-supplied urgency hints and their fixed score bonuses.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityHint {
    Critical,
    High,
    Normal,
    Low,
    Someday,
}

impl PriorityHint {
    /// Case-insensitive, whitespace-trimmed. Unknown labels yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "critical" => Some(Self::Critical),
            "high" => Some(Self::High),
            "normal" => Some(Self::Normal),
            "low" => Some(Self::Low),
            "someday" => Some(Self::Someday),
            _ => None,
        }
    }

    pub fn bonus(self) -> i64 {
        match self {
            Self::Critical => 40,
            Self::High => 20,
            Self::Normal => 0,
            Self::Low => -10,
            Self::Someday => -20,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Normal => "normal",
            Self::Low => "low",
            Self::Someday => "someday",
        }
    }
}

/// Add the hint bonus to `base_score`. Absent or unrecognized hints add 0.
pub fn apply_priority_hint(base_score: i64, hint: Option<&str>) -> i64 {
    let bonus = hint
        .and_then(PriorityHint::parse)
        .map(PriorityHint::bonus)
        .unwrap_or(0);
    base_score.saturating_add(bonus)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bonus_table() {
        assert_eq!(apply_priority_hint(10, Some("critical")), 50);
        assert_eq!(apply_priority_hint(10, Some("high")), 30);
        assert_eq!(apply_priority_hint(10, Some("normal")), 10);
        assert_eq!(apply_priority_hint(10, Some("low")), 0);
        assert_eq!(apply_priority_hint(10, Some("someday")), -10);
        assert_eq!(apply_priority_hint(10, None), 10);
    }

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(apply_priority_hint(0, Some("  HIGH \n")), 20);
        assert_eq!(PriorityHint::parse("Someday"), Some(PriorityHint::Someday));
    }

    #[test]
    fn garbage_maps_to_zero_bonus() {
        for raw in ["", "   ", "urgent!!", "ＨＩＧＨ", "null", "高"] {
            assert_eq!(apply_priority_hint(7, Some(raw)), 7, "hint {raw:?}");
        }
    }

    #[test]
    fn bonus_saturates_at_the_bounds() {
        assert_eq!(apply_priority_hint(i64::MAX, Some("critical")), i64::MAX);
        assert_eq!(apply_priority_hint(i64::MIN, Some("someday")), i64::MIN);
    }
}
