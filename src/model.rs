//! Chat-completions client for the lexical analysis call.
//!
//! One POST per request, no retries. Any transport, status, or envelope
//! failure is returned as an error for the caller to surface; only the
//! `choices[0].message.content` string is handed on for normalization.
use crate::config::{Config, ModelRoute};
use crate::http;
use crate::prompt::Message;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Anything that can answer a chat conversation with raw text.
pub trait CompletionBackend: Send + Sync {
    fn complete(&self, messages: &[Message]) -> Result<String>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

pub struct HttpCompletionBackend {
    route: ModelRoute,
    api_key: Option<String>,
    temperature: f32,
    agent: ureq::Agent,
}

impl HttpCompletionBackend {
    pub fn from_config(config: &Config) -> Self {
        HttpCompletionBackend {
            route: config.model_route(),
            api_key: config.model_api_key.clone(),
            temperature: config.temperature,
            agent: http::agent(config.model_timeout()),
        }
    }

    pub fn route(&self) -> &ModelRoute {
        &self.route
    }
}

impl CompletionBackend for HttpCompletionBackend {
    fn complete(&self, messages: &[Message]) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("model API key is not configured"))?;
        let request = ChatRequest {
            model: &self.route.model,
            messages,
            temperature: self.temperature,
        };

        let start = Instant::now();
        let mut response = self
            .agent
            .post(&self.route.endpoint)
            .header("Authorization", format!("Bearer {api_key}"))
            .send_json(&request)
            .with_context(|| format!("POST {}", self.route.endpoint))?;
        let status = response.status();

        tracing::info!(
            endpoint = %self.route.endpoint,
            model = %self.route.model,
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis(),
            "model call complete"
        );

        if !status.is_success() {
            let body = response.body_mut().read_to_string().unwrap_or_default();
            let detail: String = body.trim().chars().take(200).collect();
            return Err(anyhow!(
                "model endpoint returned status {}: {}",
                status.as_u16(),
                detail
            ));
        }

        let envelope: ChatResponse = response
            .body_mut()
            .read_json()
            .context("decode chat completion envelope")?;
        envelope
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("chat completion has no choices"))
    }
}
