use anyhow::Result;
use daybook_core::{AnnotatedTask, PriorityPipeline, Recommendation};

use crate::app::{self, App};

pub fn today(app: &App, json: bool, limit: Option<usize>) -> Result<()> {
    let tasks = app.load_tasks()?;
    let ctx = app.scoring_context()?;
    let state = app.state()?;
    let client = app.client()?;

    let pipeline =
        PriorityPipeline::new(app::ranker(&client)).with_top_n(limit.unwrap_or(app.cfg.ranking.top_n));
    let mut recs = pipeline.recommend(&tasks, &ctx, &state, app.today());
    if let Some(n) = limit {
        recs.truncate(n);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&recs)?);
        return Ok(());
    }
    if recs.is_empty() {
        println!("Nothing to do. Add a task with: daybook add <text>");
        return Ok(());
    }

    println!("# Today ({})\n", app.today());
    for (i, r) in recs.iter().enumerate() {
        println!("{}. {}", i + 1, recommendation_line(r));
        println!("   {}", r.reason);
    }
    Ok(())
}

fn recommendation_line(r: &Recommendation) -> String {
    let mut line = format!("#{} {}", r.id, r.text);
    let mut facts = Vec::new();
    if let Some(score) = r.score {
        facts.push(format!("score {score}"));
    }
    if let Some(d) = r.days_left {
        facts.push(match d {
            d if d < 0 => format!("{} days overdue", -d),
            0 => "due today".to_string(),
            d => format!("{d} days left"),
        });
    }
    if !facts.is_empty() {
        line.push_str(&format!("  [{}]", facts.join(", ")));
    }
    line
}

/// Every task, todo ones scored, with the ranker's reason where it picked one.
pub fn scored(app: &App, json: bool) -> Result<()> {
    let tasks = app.load_tasks()?;
    let ctx = app.scoring_context()?;
    let state = app.state()?;
    let client = app.client()?;

    let rows = PriorityPipeline::new(app::ranker(&client)).annotate_all(&tasks, &ctx, &state, app.today());
    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    for row in &rows {
        println!("{}", scored_line(row));
    }
    Ok(())
}

fn scored_line(row: &AnnotatedTask) -> String {
    let t = &row.task;
    let score = t.score.map_or_else(|| "-".to_string(), |s| s.to_string());
    let days = t.days_left.map_or_else(|| "-".to_string(), |d| d.to_string());
    let mut line = format!("#{:<4} {:>5} {:>5}  {}", t.id, score, days, t.text);
    if !row.reason.is_empty() {
        line.push_str(&format!("  <- {}", row.reason));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use daybook_core::{Task, TaskStatus};

    fn rec(days_left: Option<i64>) -> Recommendation {
        Recommendation {
            id: 4,
            text: "面接準備".into(),
            project: "job".into(),
            status: TaskStatus::Todo,
            tags: vec![],
            due_date: None,
            days_left,
            score: Some(30),
            reason: "締切が近い".into(),
        }
    }

    #[test]
    fn recommendation_lines() {
        assert_eq!(recommendation_line(&rec(None)), "#4 面接準備  [score 30]");
        assert_eq!(
            recommendation_line(&rec(Some(-9))),
            "#4 面接準備  [score 30, 9 days overdue]"
        );
        assert_eq!(recommendation_line(&rec(Some(0))), "#4 面接準備  [score 30, due today]");
    }

    #[test]
    fn scored_line_marks_reason() {
        let row = AnnotatedTask {
            task: Task::new(2, "洗濯").with_score(5),
            reason: String::new(),
        };
        assert_eq!(scored_line(&row), "#2        5     -  洗濯");
    }
}
