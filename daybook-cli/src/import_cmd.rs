use anyhow::{Context, Result, bail};
use daybook_core::normalize_state;
use daybook_ingest::{Journal, plan_import};
use serde_json::Value;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use crate::app::App;

pub fn import_state(app: &App, path: Option<PathBuf>, paste: bool) -> Result<()> {
    let journal = match (path, paste) {
        (Some(p), false) => {
            let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
            Journal::from_json(&s).with_context(|| format!("parse {}", p.display()))?
        }
        (None, true) => {
            println!("Paste the journal JSON, then press Ctrl-D:");
            let mut s = String::new();
            io::stdin().read_to_string(&mut s).context("read stdin")?;
            Journal::from_pasted(&s).context("parse pasted journal")?
        }
        _ => bail!("pass either a journal file or --paste"),
    };

    let existing = app.load_tasks_for_append()?;
    let plan = plan_import(&existing, &journal, app.now());

    let state_file = app.data.state();
    state_file
        .save(&plan.state)
        .with_context(|| format!("write {}", state_file.path().display()))?;
    println!("Updated {}", state_file.path().display());

    if plan.malformed_new_tasks {
        println!("new_tasks is not an array; no tasks were added.");
        return Ok(());
    }

    let log = app.data.tasks();
    for t in &plan.new_tasks {
        log.append(t)
            .with_context(|| format!("append to {}", log.path().display()))?;
    }
    println!(
        "Added {} task(s) from new_tasks ({} already present).",
        plan.new_tasks.len(),
        plan.duplicates
    );
    Ok(())
}

pub fn show_state(app: &App) -> Result<()> {
    let state = app.state()?;
    if state.as_object().is_some_and(|m| m.is_empty()) {
        println!("No state imported yet. Run: daybook import-state <journal.json>");
        return Ok(());
    }
    println!("{}", serde_json::to_string_pretty(&state)?);
    println!("\n# As seen by the ranker");
    println!("{}", serde_json::to_string_pretty(&Value::Object(normalize_state(&state)))?);
    Ok(())
}
