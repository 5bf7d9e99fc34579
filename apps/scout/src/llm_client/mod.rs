/// LLM Client — the single point of entry for all chat-completion calls.
///
/// Speaks the OpenAI-compatible chat completions dialect (Groq by default).
/// One attempt per call: throttling between calls belongs to the batch runner.
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[cfg(test)]
pub mod stub;

pub const DEFAULT_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const TEMPERATURE: f64 = 0.7;
/// Raw error bodies are cut to this many characters before being surfaced.
const RAW_BODY_PREVIEW_CHARS: usize = 150;
const LOG_BODY_PREVIEW_CHARS: usize = 500;

/// Every variant renders with the `ERRORE` prefix: the rendered text is what
/// lands in the result table when a generation fails.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("ERRORE: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("ERRORE API: {message}")]
    Api { status: u16, message: String },

    #[error("ERRORE {status}: {body}")]
    ApiRaw { status: u16, body: String },

    #[error("ERRORE: risposta non valida ({0})")]
    Parse(#[from] serde_json::Error),

    #[error("ERRORE: Risposta vuota dall'API")]
    EmptyResponse,
}

impl LlmError {
    pub fn kind(&self) -> &'static str {
        match self {
            LlmError::Transport(_) => "transport",
            LlmError::Api { .. } | LlmError::ApiRaw { .. } => "api",
            LlmError::Parse(_) => "parse",
            LlmError::EmptyResponse => "empty_response",
        }
    }

    /// HTTP status of a non-200 API answer.
    pub fn status(&self) -> Option<u16> {
        match self {
            LlmError::Api { status, .. } | LlmError::ApiRaw { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A single-message chat completion request.
#[derive(Debug, Clone, Copy)]
pub struct ChatCompletion<'a> {
    pub api_key: &'a str,
    pub model: &'a str,
    pub max_tokens: u32,
    pub prompt: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Option<Vec<Choice>>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_url: String,
}

impl LlmClient {
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_url: api_url.into(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Sends one chat completion and returns the trimmed text of the first choice.
    pub async fn complete(&self, request: ChatCompletion<'_>) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: request.model,
            messages: vec![ChatMessage {
                role: "user",
                content: request.prompt,
            }],
            temperature: TEMPERATURE,
            max_tokens: request.max_tokens,
        };

        debug!(
            model = request.model,
            max_tokens = request.max_tokens,
            "Calling chat completions API"
        );

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(request.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        debug!(
            "Response {}: {}",
            status.as_u16(),
            truncate_chars(&text, LOG_BODY_PREVIEW_CHARS)
        );

        if status != StatusCode::OK {
            warn!("Chat completions API returned {}: {}", status.as_u16(), text);
            return Err(api_error(status.as_u16(), &text));
        }

        parse_completion(&text)
    }
}

/// Prefers the structured `{"error":{"message"}}` payload, falling back to a
/// truncated raw body.
fn api_error(status: u16, body: &str) -> LlmError {
    let message = serde_json::from_str::<ApiErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error)
        .and_then(|e| e.message)
        .filter(|m| !m.is_empty());

    match message {
        Some(message) => LlmError::Api { status, message },
        None => LlmError::ApiRaw {
            status,
            body: truncate_chars(body, RAW_BODY_PREVIEW_CHARS).to_string(),
        },
    }
}

fn parse_completion(body: &str) -> Result<String, LlmError> {
    let response: ChatResponse = serde_json::from_str(body)?;

    response
        .choices
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|content| content.trim().to_string())
        .ok_or(LlmError::EmptyResponse)
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
