//! Gemini `generateContent` client.
//!
//! Sends the roster prompt with a strict `responseSchema` and JSON response
//! MIME type, then parses the first candidate's text through
//! [`super::parse_sessions`].

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use super::{GeneratedSession, GenerationError, RosterGenerator, parse_sessions};
use crate::request::{RosterRequest, response_schema};

/// Default API base URL (API-key auth).
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Tokens the model may spend reasoning about conflicts before answering.
pub const DEFAULT_THINKING_BUDGET: u32 = 1024;

/// Output cap. Must leave room for the thinking budget.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 8192;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini client configuration.
#[derive(Clone, Debug)]
pub struct GeminiConfig {
    pub api_key: String,
    /// Model ID (e.g., `gemini-2.5-flash`).
    pub model: String,
    /// Base URL without trailing slash, up to and including the API version.
    pub base_url: String,
    /// `None` disables the thinking config entirely.
    pub thinking_budget: Option<u32>,
    pub max_output_tokens: u32,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_owned(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            thinking_budget: Some(DEFAULT_THINKING_BUDGET),
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    /// Set on reasoning parts when thoughts are included in the reply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: serde_json::Value,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated non-thought text of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter(|p| p.thought != Some(true))
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

/// Gemini-backed [`RosterGenerator`].
pub struct GeminiClient {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    /// Use a caller-supplied HTTP client.
    pub fn with_client(config: GeminiConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }

    fn build_headers(&self) -> Result<HeaderMap, GenerationError> {
        let mut headers = HeaderMap::new();
        let _ = headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let key = HeaderValue::from_str(&self.config.api_key)
            .map_err(|e| GenerationError::Transport(format!("invalid API key header: {e}")))?;
        let _ = headers.insert(API_KEY_HEADER, key);
        Ok(headers)
    }

    fn build_body(&self, request: &RosterRequest) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_owned()),
                parts: vec![Part {
                    text: Some(request.prompt()),
                    thought: None,
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: response_schema(),
                max_output_tokens: self.config.max_output_tokens,
                thinking_config: self
                    .config
                    .thinking_budget
                    .map(|thinking_budget| ThinkingConfig { thinking_budget }),
            },
        }
    }
}

#[async_trait]
impl RosterGenerator for GeminiClient {
    fn name(&self) -> &str {
        &self.config.model
    }

    #[instrument(skip_all, fields(model = %self.config.model))]
    async fn generate(
        &self,
        request: &RosterRequest,
    ) -> Result<Vec<GeneratedSession>, GenerationError> {
        debug!(
            starters = request.starters.len(),
            mentors = request.mentors.len(),
            modules = request.modules.len(),
            start_date = %request.start_date,
            "sending roster request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .headers(self.build_headers()?)
            .json(&self.build_body(request))
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = parse_api_error(&body, status.as_u16());
            error!(status = status.as_u16(), %message, "Gemini API error");
            return Err(GenerationError::Transport(message));
        }

        let envelope: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| GenerationError::Schema(format!("unreadable response envelope: {e}")))?;

        if let Some(reason) = envelope
            .candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
        {
            debug!(finish_reason = reason, "candidate finished");
        }

        let sessions = parse_sessions(&envelope.text())?;
        info!(sessions = sessions.len(), "roster reply parsed");
        Ok(sessions)
    }
}

/// Extract a readable message from an API error body.
fn parse_api_error(body: &str, status: u16) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(json) => {
            let message = json["error"]["message"].as_str().unwrap_or("Unknown error");
            match json["error"]["status"].as_str() {
                Some(code) => format!("HTTP {status} {code}: {message}"),
                None => format!("HTTP {status}: {message}"),
            }
        }
        Err(_) => format!("HTTP {status}: {body}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let cfg = GeminiConfig::new("k");
        assert_eq!(cfg.model, "gemini-2.5-flash");
        assert_eq!(cfg.thinking_budget, Some(1024));
        assert_eq!(cfg.max_output_tokens, 8192);
        assert_eq!(
            GeminiClient::new(cfg).endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let cfg = GeminiConfig::new("k").with_base_url("http://localhost:9000/v1beta/");
        assert_eq!(cfg.base_url, "http://localhost:9000/v1beta");
    }

    #[test]
    fn body_carries_schema_and_thinking_budget() {
        let client = GeminiClient::new(GeminiConfig::new("k"));
        let request = RosterRequest::from_state(
            &crate::state::AppState::defaults(),
            chrono::NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
        )
        .unwrap();

        let body = serde_json::to_value(client.build_body(&request)).unwrap();
        let generation_config = &body["generationConfig"];
        assert_eq!(generation_config["responseMimeType"], "application/json");
        assert_eq!(generation_config["responseSchema"]["type"], "ARRAY");
        assert_eq!(generation_config["maxOutputTokens"], 8192);
        assert_eq!(generation_config["thinkingConfig"]["thinkingBudget"], 1024);
        assert_eq!(body["contents"][0]["role"], "user");
        assert!(
            body["contents"][0]["parts"][0]["text"]
                .as_str()
                .unwrap()
                .contains("Start Date: 2026-01-05")
        );
    }

    #[test]
    fn thinking_config_omitted_when_disabled() {
        let mut cfg = GeminiConfig::new("k");
        cfg.thinking_budget = None;
        let client = GeminiClient::new(cfg);
        let request = RosterRequest::from_state(
            &crate::state::AppState::defaults(),
            chrono::NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
        )
        .unwrap();
        let body = serde_json::to_value(client.build_body(&request)).unwrap();
        assert!(body["generationConfig"].get("thinkingConfig").is_none());
    }

    #[test]
    fn response_text_skips_thoughts_and_joins_parts() {
        let envelope: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": { "role": "model", "parts": [
                    { "text": "thinking about Monday", "thought": true },
                    { "text": "[{\"day\":\"Monday\"," },
                    { "text": "\"time\":\"09:00\"}]" }
                ]},
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        assert_eq!(envelope.text(), r#"[{"day":"Monday","time":"09:00"}]"#);
    }

    #[test]
    fn response_without_candidates_has_empty_text() {
        let envelope: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(envelope.text(), "");
    }

    #[test]
    fn parse_api_error_json() {
        let body = r#"{"error":{"code":403,"status":"PERMISSION_DENIED","message":"API key not valid"}}"#;
        assert_eq!(
            parse_api_error(body, 403),
            "HTTP 403 PERMISSION_DENIED: API key not valid"
        );
    }

    #[test]
    fn parse_api_error_non_json() {
        assert_eq!(parse_api_error("Bad Gateway", 502), "HTTP 502: Bad Gateway");
    }
}
