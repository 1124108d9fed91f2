//! Text-completion client for the Gemini `generateContent` API.
//!
//! The session layer talks to the model only through [`TextGenerator`], so
//! tests can substitute a scripted generator for [`GeminiClient`].

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::error::GenerateError;

pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Longest raw error body echoed back to the user.
const ERROR_BODY_PREVIEW_CHARS: usize = 100;

// ── Types ────────────────────────────────────────────────────────────────────

/// The three kinds of generation call, each with its own output budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationKind {
    SingleCategory,
    Integrated,
    Refinement,
}

impl GenerationKind {
    pub fn max_output_tokens(self) -> u32 {
        match self {
            GenerationKind::SingleCategory => 4096,
            GenerationKind::Integrated => 8192,
            GenerationKind::Refinement => 2048,
        }
    }
}

/// A prompt plus the sampling configuration to send with it.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub kind: GenerationKind,
    pub prompt: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl GenerationRequest {
    pub fn new(kind: GenerationKind, prompt: String) -> Self {
        Self {
            kind,
            prompt,
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: kind.max_output_tokens(),
        }
    }
}

/// An opaque text-completion service.
pub trait TextGenerator {
    /// Send one request and return the generated text.
    ///
    /// An empty string is a valid result; it is the parser's job to turn it
    /// into a usable record.
    fn generate(&self, api_key: &str, request: &GenerationRequest) -> Result<String, GenerateError>;
}

// ── Gemini ───────────────────────────────────────────────────────────────────

/// Blocking HTTP client for Gemini.
pub struct GeminiClient {
    agent: ureq::Agent,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL, DEFAULT_MODEL)
    }
}

impl TextGenerator for GeminiClient {
    fn generate(&self, api_key: &str, request: &GenerationRequest) -> Result<String, GenerateError> {
        let payload = serde_json::to_string(&request_body(request))?;

        info!(
            model = %self.model,
            kind = ?request.kind,
            max_output_tokens = request.max_output_tokens,
            "sending generation request"
        );

        let mut response = self
            .agent
            .post(&self.endpoint())
            .query("key", api_key)
            .header("content-type", "application/json")
            .send(payload)
            .map_err(|e| GenerateError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .body_mut()
            .read_to_string()
            .map_err(|e| GenerateError::Transport(e.to_string()))?;

        debug!(status, body_len = text.len(), "generation response received");

        if !(200..300).contains(&status) {
            return Err(GenerateError::Http {
                status,
                message: error_message(status, &text),
            });
        }

        let value: serde_json::Value = serde_json::from_str(&text)?;
        Ok(candidate_text(&value))
    }
}

/// Build the `generateContent` request body.
pub fn request_body(request: &GenerationRequest) -> serde_json::Value {
    json!({
        "contents": [{ "parts": [{ "text": request.prompt }] }],
        "generationConfig": {
            "temperature": request.temperature,
            "maxOutputTokens": request.max_output_tokens,
        }
    })
}

/// Pull the generated text out of a `generateContent` response.
///
/// Returns an empty string when the response has no candidate text.
pub fn candidate_text(response: &serde_json::Value) -> String {
    response
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(|t| t.as_str())
        .unwrap_or_default()
        .to_string()
}

/// Human-readable message for a failed call.
///
/// Prefers the API's own `error.message`; otherwise reports the status code
/// with the start of the raw body.
pub fn error_message(status: u16, body: &str) -> String {
    let embedded = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .filter(|m| !m.is_empty());

    embedded.unwrap_or_else(|| {
        let preview: String = body.chars().take(ERROR_BODY_PREVIEW_CHARS).collect();
        format!("status {status}: {preview}")
    })
}
