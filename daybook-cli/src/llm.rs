//! OpenAI-compatible chat-completions client behind the core service traits.

use std::time::Duration;

use daybook_core::remote::TAGGING_INSTRUCTIONS;
use daybook_core::{RankRequest, RankingService, ServiceError, TagRequest, TaggingService};
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::config::LlmSection;

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f32,
    api_key: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct Req<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    temperature: f32,
    response_format: serde_json::Value,
}

#[derive(Deserialize)]
struct Resp {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MsgOut,
}

#[derive(Deserialize)]
struct MsgOut {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(cfg: &LlmSection, api_key: String) -> Result<Self, ServiceError> {
        let timeout = Duration::from_secs(cfg.timeout_secs.max(1));
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: format!("{}/v1/chat/completions", cfg.base_url.trim_end_matches('/')),
            model: cfg.model.clone(),
            temperature: cfg.temperature,
            api_key,
            timeout,
        })
    }

    /// Blocking call; returns the assistant message text.
    pub fn complete_json(&self, system: &str, user: &str) -> Result<String, ServiceError> {
        // Already inside the CLI's runtime: a nested block_on would panic.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            tokio::task::block_in_place(|| handle.block_on(self.complete_json_async(system, user)))
        } else {
            let rt = tokio::runtime::Runtime::new().map_err(|e| ServiceError::Transport(e.to_string()))?;
            rt.block_on(self.complete_json_async(system, user))
        }
    }

    async fn complete_json_async(&self, system: &str, user: &str) -> Result<String, ServiceError> {
        let body = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: system,
                },
                Msg {
                    role: "user",
                    content: user,
                },
            ],
            temperature: self.temperature,
            response_format: json!({"type": "json_object"}),
        };

        debug!(model = %self.model, endpoint = %self.endpoint, "sending chat completion");
        let resp = self
            .http
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport(e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let out: Resp = resp.json().await.map_err(|e| self.transport(e))?;
        Ok(out
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default()
            .trim()
            .to_string())
    }

    fn transport(&self, e: reqwest::Error) -> ServiceError {
        if e.is_timeout() {
            ServiceError::Timeout(self.timeout)
        } else {
            ServiceError::Transport(e.to_string())
        }
    }
}

fn encode<T: Serialize>(value: &T) -> Result<String, ServiceError> {
    serde_json::to_string(value).map_err(|e| ServiceError::Transport(format!("encode request: {e}")))
}

impl RankingService for OpenAiClient {
    fn rank(&self, request: &RankRequest) -> Result<String, ServiceError> {
        let user = encode(&json!({
            "state": request.state,
            "tasks": request.tasks,
        }))?;
        self.complete_json(&request.system_instructions, &user)
    }
}

impl TaggingService for OpenAiClient {
    fn suggest_tags(&self, request: &TagRequest) -> Result<String, ServiceError> {
        self.complete_json(TAGGING_INSTRUCTIONS, &encode(request)?)
    }
}
