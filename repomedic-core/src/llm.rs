//! LLM access over an OpenAI-compatible chat completions API.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::BoxFuture;
use crate::error::{RepoMedicError, Result, ensure_success};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const TEXT_SYSTEM_PROMPT: &str = "You are an expert software engineer who writes clear, accurate project documentation.";

/// Text and structured-output generation.
pub trait TextGenerator: Send + Sync {
    /// Produce free-form text for `prompt`.
    fn generate_text<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String>>;

    /// Produce a JSON value shaped by `schema`.
    fn generate_object<'a>(
        &'a self,
        prompt: &'a str,
        schema: &'a Value,
    ) -> BoxFuture<'a, Result<Value>>;
}

/// Async sleep abstraction so retry delays can be observed in tests.
pub trait Sleeper: Send + Sync {
    /// Wait for `duration`.
    fn sleep<'a>(&'a self, duration: Duration) -> BoxFuture<'a, ()>;
}

/// Tokio-backed sleeper used in production.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep<'a>(&'a self, duration: Duration) -> BoxFuture<'a, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// How often and how patiently generation is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Pause between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            delay: Duration::from_secs(1),
        }
    }
}

/// Generate text, retrying failures according to `policy`.
///
/// Returns the last error once every attempt has failed.
pub async fn generate_with_retry(
    generator: &dyn TextGenerator,
    sleeper: &dyn Sleeper,
    prompt: &str,
    policy: RetryPolicy,
) -> Result<String> {
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match generator.generate_text(prompt).await {
            Ok(text) => return Ok(text),
            Err(err) if attempt < attempts => {
                log::warn!("generation attempt {attempt}/{attempts} failed: {err}");
                sleeper.sleep(policy.delay).await;
                attempt += 1;
            }
            Err(err) => {
                log::warn!("generation failed after {attempts} attempts: {err}");
                return Err(err);
            }
        }
    }
}

/// Connection settings for the chat completions endpoint.
#[derive(Clone)]
pub struct LlmSettings {
    /// API base URL, without the `/chat/completions` suffix.
    pub base_url: String,
    /// Bearer API key.
    pub api_key: Option<String>,
    /// Model identifier.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl LlmSettings {
    /// Load settings from the `REPOMEDIC_LLM_*` variables.
    ///
    /// The API key falls back to `OPENAI_API_KEY`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let api_key = std::env::var("REPOMEDIC_LLM_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty());
        let timeout_secs = std::env::var("REPOMEDIC_LLM_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(defaults.timeout_secs);
        Self {
            base_url: std::env::var("REPOMEDIC_LLM_URL").unwrap_or(defaults.base_url),
            api_key,
            model: std::env::var("REPOMEDIC_LLM_MODEL").unwrap_or(defaults.model),
            timeout_secs,
        }
    }
}

/// [`TextGenerator`] backed by an OpenAI-compatible `/chat/completions` API.
#[derive(Clone)]
pub struct ChatCompletionsClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for ChatCompletionsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl ChatCompletionsClient {
    /// Build a client; fails when no API key is configured.
    pub fn new(settings: LlmSettings) -> Result<Self> {
        let api_key = settings.api_key.ok_or_else(|| {
            RepoMedicError::Config(
                "LLM API key not found. Set REPOMEDIC_LLM_API_KEY or OPENAI_API_KEY".to_string(),
            )
        })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: settings.model,
        })
    }

    /// Build a client from environment settings.
    pub fn from_env() -> Result<Self> {
        Self::new(LlmSettings::from_env())
    }

    /// Model used for completions.
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        system: String,
        prompt: &str,
        response_format: Option<ResponseFormat>,
    ) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt.to_string(),
                },
            ],
            response_format,
        };
        log::debug!("requesting completion from {} ({})", self.base_url, self.model);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        let body = ensure_success("llm", response)
            .await?
            .json::<ChatResponse>()
            .await?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| RepoMedicError::Other("no content in LLM response".to_string()))
    }

    async fn complete_text(&self, prompt: &str) -> Result<String> {
        self.complete(TEXT_SYSTEM_PROMPT.to_string(), prompt, None)
            .await
    }

    async fn complete_object(&self, prompt: &str, schema: &Value) -> Result<Value> {
        let schema_text = serde_json::to_string_pretty(schema)?;
        let system = format!(
            "You are an expert software engineer. Always respond with valid JSON matching this schema:\n\n```json\n{schema_text}\n```\n\nRespond ONLY with valid JSON, no explanation."
        );
        let reply = self
            .complete(
                system,
                prompt,
                Some(ResponseFormat {
                    format_type: "json_object",
                }),
            )
            .await?;
        extract_json(&reply)
    }
}

impl TextGenerator for ChatCompletionsClient {
    fn generate_text<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(self.complete_text(prompt))
    }

    fn generate_object<'a>(
        &'a self,
        prompt: &'a str,
        schema: &'a Value,
    ) -> BoxFuture<'a, Result<Value>> {
        Box::pin(self.complete_object(prompt, schema))
    }
}

/// Decode a JSON object from a reply, unwrapping Markdown code fences.
pub fn extract_json(reply: &str) -> Result<Value> {
    let trimmed = reply.trim();
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }
    let unfenced = strip_code_fence(trimmed);
    if let Ok(value) = serde_json::from_str(unfenced) {
        return Ok(value);
    }
    match (unfenced.find('{'), unfenced.rfind('}')) {
        (Some(start), Some(end)) if start < end => {
            Ok(serde_json::from_str(&unfenced[start..=end])?)
        }
        _ => Ok(serde_json::from_str(unfenced)?),
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}
