use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::prompt::SupportRequest;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Per-call generation parameters. Supplied per turn, not persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_output_tokens: 500,
        }
    }
}

/// Tagged failure reasons from the completion client. The session controller
/// translates these into the user-facing fallback message in exactly one place.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Gemini API error {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("completion task aborted: {0}")]
    Aborted(String),
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: RequestGenerationConfig,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: &str) -> Self {
        Self::with_model(api_key, DEFAULT_MODEL)
    }

    pub fn with_model(api_key: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one support request and return the model's reply text verbatim.
    /// The reply is expected to contain the markup tags the prompt asked for,
    /// but the model may not comply; no schema validation is performed.
    pub async fn complete(
        &self,
        request: &SupportRequest,
        config: &GenerationConfig,
    ) -> Result<String, CompletionError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let prompt = request.render();

        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: &prompt }],
            }],
            generation_config: RequestGenerationConfig {
                temperature: config.temperature,
                max_output_tokens: config.max_output_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Api { status, body });
        }

        let body = response.text().await?;
        parse_reply(&body)
    }
}

/// Extract the reply text from a generateContent response body.
pub fn parse_reply(body: &str) -> Result<String, CompletionError> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|err| CompletionError::MalformedResponse(err.to_string()))?;

    let mut reply = String::new();
    for candidate in response.candidates.unwrap_or_default() {
        let parts = candidate
            .content
            .and_then(|content| content.parts)
            .unwrap_or_default();
        for part in parts {
            if let Some(text) = part.text {
                reply.push_str(&text);
            }
        }
    }

    if reply.is_empty() {
        return Err(CompletionError::MalformedResponse(
            "no candidate text in response".to_string(),
        ));
    }

    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reply_extracts_candidate_text() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"<p>I hear you...</p>"}],"role":"model"}}]}"#;
        assert_eq!(parse_reply(body).unwrap(), "<p>I hear you...</p>");
    }

    #[test]
    fn parse_reply_concatenates_parts() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"<p>Hello"},{"text":" there</p>"}]}}]}"#;
        assert_eq!(parse_reply(body).unwrap(), "<p>Hello there</p>");
    }

    #[test]
    fn parse_reply_rejects_empty_candidates() {
        assert!(matches!(
            parse_reply(r#"{"candidates":[]}"#),
            Err(CompletionError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_reply(r#"{}"#),
            Err(CompletionError::MalformedResponse(_))
        ));
    }

    #[test]
    fn parse_reply_rejects_invalid_json() {
        assert!(matches!(
            parse_reply("not json"),
            Err(CompletionError::MalformedResponse(_))
        ));
    }

    #[test]
    fn request_serializes_with_camel_case_config() {
        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: "hello" }],
            }],
            generation_config: RequestGenerationConfig {
                temperature: 0.3,
                max_output_tokens: 500,
            },
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains(r#""generationConfig""#));
        assert!(json.contains(r#""maxOutputTokens":500"#));
        assert!(json.contains(r#""text":"hello""#));
    }
}
