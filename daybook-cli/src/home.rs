use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$DAYBOOK_HOME`, else `~/.daybook`.
pub fn daybook_home() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os("DAYBOOK_HOME").filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set (or set DAYBOOK_HOME)")?;
    Ok(PathBuf::from(home).join(".daybook"))
}

pub fn ensure_daybook_home() -> Result<PathBuf> {
    let dir = daybook_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}
