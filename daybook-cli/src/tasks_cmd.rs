use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::Args;
use daybook_core::{DEFAULT_PROJECT, PriorityHint, Task, TaskStatus, summarize_projects};
use daybook_store::{CompleteOutcome, next_id};
use tracing::warn;

use crate::app::{self, App};

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Task text (words are joined with spaces)
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,

    /// Due date, YYYY-MM-DD
    #[arg(long)]
    pub due: Option<String>,

    /// Project id from projects.json (default: "default")
    #[arg(long)]
    pub project: Option<String>,

    /// critical | high | normal | low | someday
    #[arg(long)]
    pub priority: Option<String>,

    /// Tag key; repeatable. Skips tag suggestion.
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Don't ask the remote model for tags
    #[arg(long, default_value_t = false)]
    pub no_suggest: bool,
}

pub fn add(app: &App, args: AddArgs) -> Result<()> {
    let text = args.text.join(" ").trim().to_string();
    if text.is_empty() {
        bail!("task text is empty");
    }
    if let Some(due) = &args.due {
        NaiveDate::parse_from_str(due, "%Y-%m-%d")
            .with_context(|| format!("--due {due:?} is not a YYYY-MM-DD date"))?;
    }
    if let Some(p) = &args.priority {
        if PriorityHint::parse(p).is_none() {
            bail!("unknown --priority {p:?} (expected critical, high, normal, low or someday)");
        }
    }

    let masters = app.data.masters();
    let project = args.project.unwrap_or_else(|| DEFAULT_PROJECT.to_string());
    if project != DEFAULT_PROJECT && !masters.load_projects()?.contains_key(&project) {
        warn!(project = %project, "project is not defined in projects.json");
    }

    let candidates = masters.load_tag_candidates()?;
    let tags = if !args.tags.is_empty() {
        for t in args.tags.iter().filter(|t| !candidates.contains(t)) {
            warn!(tag = %t, "tag is not in the tag master");
        }
        args.tags
    } else if args.no_suggest {
        Vec::new()
    } else {
        let client = app.client()?;
        let suggested = app::tagger(&client).suggest(&text, "", &candidates);
        if !suggested.is_empty() {
            println!("Suggested tags: {}", suggested.join(", "));
        }
        suggested
    };

    let id = next_id(&app.load_tasks_for_append()?);
    let mut task = Task::new(id, text)
        .with_project(project)
        .with_tags(tags)
        .with_created_at(app.today().to_string());
    task.due_date = args.due;
    task.priority_hint = args.priority;

    let log = app.data.tasks();
    log.append(&task)
        .with_context(|| format!("append to {}", log.path().display()))?;
    println!("Added #{}: {}", task.id, task.text);
    Ok(())
}

pub fn list(app: &App, all: bool) -> Result<()> {
    let tasks = app.load_tasks()?;
    let shown: Vec<&Task> = tasks.iter().filter(|t| all || t.is_todo()).collect();
    if shown.is_empty() {
        println!("No tasks.");
        return Ok(());
    }
    for t in shown {
        println!("{}", task_line(t));
    }
    Ok(())
}

fn task_line(t: &Task) -> String {
    let mark = match t.status {
        TaskStatus::Todo => ' ',
        TaskStatus::Done => 'x',
    };
    let mut line = format!("[{mark}] #{:<4} {}  ({}", t.id, t.text, t.project);
    if let Some(due) = &t.due_date {
        line.push_str(&format!(", due {due}"));
    }
    if let Some(hint) = &t.priority_hint {
        line.push_str(&format!(", {hint}"));
    }
    line.push(')');
    if !t.tags.is_empty() {
        line.push_str(&format!(" #{}", t.tags.join(" #")));
    }
    line
}

/// Always reads the log strictly: a rewrite must not drop unreadable lines.
pub fn done(app: &App, id: i64) -> Result<()> {
    let log = app.data.tasks();
    let outcome = log
        .complete(id, &app.timestamp())
        .with_context(|| format!("complete #{id} in {}", log.path().display()))?;
    match outcome {
        CompleteOutcome::Completed => println!("Completed #{id}"),
        CompleteOutcome::AlreadyDone => println!("#{id} was already done"),
        CompleteOutcome::NotFound => bail!("no task with id {id}"),
    }
    Ok(())
}

pub fn projects(app: &App) -> Result<()> {
    let tasks = app.load_tasks()?;
    let projects = app.data.masters().load_projects().context("load project master")?;
    for row in summarize_projects(&tasks, &projects) {
        println!(
            "{:<16} {:>3}%  {}/{}  {}  {}",
            row.id, row.progress, row.done, row.total, row.name, row.description
        );
    }
    Ok(())
}
