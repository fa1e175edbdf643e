//! Per-invocation context shared by the data commands.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use daybook_core::{RemoteRanker, RemoteTagger, ScoringContext, Task};
use daybook_store::DataDir;
use serde_json::Value;
use tracing::{info, warn};

use crate::auth;
use crate::config::{Config, load_config};
use crate::llm::OpenAiClient;

pub struct App {
    pub cfg: Config,
    pub data: DataDir,
    tz: Tz,
    skip_corrupt: bool,
}

impl App {
    pub fn load(skip_corrupt: bool) -> Result<Self> {
        let cfg = load_config()?;
        let tz = cfg.ranking.tz()?;
        let data = DataDir::new(cfg.data_dir()?);
        Ok(Self {
            cfg,
            data,
            tz,
            skip_corrupt,
        })
    }

    #[cfg(test)]
    pub fn with_data(data: DataDir, skip_corrupt: bool) -> Self {
        let mut cfg = Config::default();
        cfg.llm.provider = "off".to_string();
        Self {
            cfg,
            data,
            tz: chrono_tz::Asia::Tokyo,
            skip_corrupt,
        }
    }

    /// Wall-clock time in the configured zone.
    pub fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.tz).naive_local()
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date()
    }

    pub fn timestamp(&self) -> String {
        self.now().format("%Y-%m-%dT%H:%M:%S").to_string()
    }

    pub fn load_tasks(&self) -> Result<Vec<Task>> {
        let log = self.data.tasks();
        if !self.skip_corrupt {
            return log.load().with_context(|| {
                format!(
                    "load {} (pass --skip-corrupt to skip unreadable lines)",
                    log.path().display()
                )
            });
        }

        let report = log
            .load_report()
            .with_context(|| format!("load {}", log.path().display()))?;
        if !report.corrupt.is_empty() {
            let lines: Vec<String> = report.corrupt.iter().map(|c| c.line.to_string()).collect();
            warn!(
                skipped = report.corrupt.len(),
                lines = %lines.join(","),
                "skipped corrupt lines in task log"
            );
        }
        Ok(report.tasks)
    }

    /// Tasks that new ids are allocated against. Always strict, since a skipped
    /// line may hold the highest id.
    pub fn load_tasks_for_append(&self) -> Result<Vec<Task>> {
        let log = self.data.tasks();
        log.load().with_context(|| {
            format!(
                "load {} (new ids must not collide with unreadable lines; fix or remove them first)",
                log.path().display()
            )
        })
    }

    pub fn scoring_context(&self) -> Result<ScoringContext> {
        let masters = self.data.masters();
        Ok(ScoringContext {
            tag_weights: masters.load_tag_weights().context("load tag master")?,
            projects: masters.load_projects().context("load project master")?,
        })
    }

    pub fn state(&self) -> Result<Value> {
        let file = self.data.state();
        let state = file
            .load()
            .with_context(|| format!("load {}", file.path().display()))?;
        Ok(Value::Object(state))
    }

    /// `None` when the remote model is switched off or no key is available.
    pub fn client(&self) -> Result<Option<OpenAiClient>> {
        let llm = &self.cfg.llm;
        if llm.is_off() {
            info!("remote model disabled in config");
            return Ok(None);
        }
        if !llm.provider.eq_ignore_ascii_case("openai") {
            warn!(provider = %llm.provider, "unknown [llm].provider; running offline");
            return Ok(None);
        }
        let Some(key) = auth::openai_api_key()? else {
            info!("no OpenAI API key (set OPENAI_API_KEY or run: daybook auth paste-openai-api-key); running offline");
            return Ok(None);
        };
        Ok(Some(OpenAiClient::new(llm, key)?))
    }
}

pub fn ranker(client: &Option<OpenAiClient>) -> RemoteRanker<'_> {
    match client {
        Some(c) => RemoteRanker::new(c),
        None => RemoteRanker::offline(),
    }
}

pub fn tagger(client: &Option<OpenAiClient>) -> RemoteTagger<'_> {
    match client {
        Some(c) => RemoteTagger::new(c),
        None => RemoteTagger::offline(),
    }
}
