//! Outbound model boundary.
//!
//! `ModelClient` abstracts the remote chat-completion call so the analysis
//! pipeline can run against OpenRouter in production and a queued mock in
//! tests. Transport failures surface as errors here; the orchestrator is
//! responsible for converting them into fallback results.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_MODEL: &str = "google/gemini-flash";

/// A remote language model taking a prompt and returning its raw reply text.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn invoke(&self, prompt: &str) -> Result<String>;
}

/// OpenRouter chat-completions client.
pub struct OpenRouterClient {
    base_url: String,
    model: String,
    api_key: String,
    http: reqwest::Client,
}

impl OpenRouterClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("failed to build HTTP client for OpenRouter")?;

        Ok(Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            api_key: api_key.into(),
            http,
        })
    }

    /// Build a client from `OPENROUTER_API_KEY`, with `SENTIMENT_MODEL` and
    /// `OPENROUTER_BASE_URL` overriding the defaults.
    pub fn from_env() -> Result<Self> {
        let api_key =
            std::env::var("OPENROUTER_API_KEY").context("OPENROUTER_API_KEY must be set")?;
        let model =
            std::env::var("SENTIMENT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let mut client = Self::new(api_key, model)?;
        if let Ok(base_url) = std::env::var("OPENROUTER_BASE_URL") {
            client.base_url = base_url;
        }
        Ok(client)
    }
}

#[async_trait]
impl ModelClient for OpenRouterClient {
    async fn invoke(&self, prompt: &str) -> Result<String> {
        let payload = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: 0.0,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("HTTP-Referer", "https://rust-sentiment.app")
            .header("X-Title", "Rust Sentiment")
            .json(&payload)
            .send()
            .await
            .context("OpenRouter request failed")?
            .error_for_status()
            .context("OpenRouter returned an error status")?;

        let parsed: ChatResponse = response
            .json()
            .await
            .context("OpenRouter response was not valid JSON")?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .context("OpenRouter response contained no choices")
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Queue-backed test double. Replies (or failures) are returned in the
/// order they were pushed; an empty queue yields an error.
#[derive(Default)]
pub struct MockModelClient {
    responses: Mutex<VecDeque<Result<String, String>>>,
}

impl MockModelClient {
    pub fn push_response(&self, response: impl Into<String>) {
        self.queue().push_back(Ok(response.into()));
    }

    pub fn push_failure(&self, message: impl Into<String>) {
        self.queue().push_back(Err(message.into()));
    }

    fn queue(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<String, String>>> {
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ModelClient for MockModelClient {
    async fn invoke(&self, _prompt: &str) -> Result<String> {
        match self.queue().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(anyhow::anyhow!(message)),
            None => Err(anyhow::anyhow!("no mock response queued")),
        }
    }
}
