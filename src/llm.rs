use serde::{Deserialize, Serialize};
use reqwest::Client;
use crate::error::{AppError, Result};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// One turn of the conversation as the Gemini wire format sees it.
#[derive(Debug, Clone)]
pub struct WireTurn {
    pub role: WireRole,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireRole {
    User,
    Model,
}

impl WireRole {
    fn as_str(self) -> &'static str {
        match self {
            WireRole::User => "user",
            WireRole::Model => "model",
        }
    }
}

impl WireTurn {
    pub fn user(text: &str) -> Self {
        Self { role: WireRole::User, text: text.to_string() }
    }

    pub fn model(text: &str) -> Self {
        Self { role: WireRole::Model, text: text.to_string() }
    }
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
}

#[derive(Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: String,
}

#[derive(Deserialize)]
struct UsageMetadata {
    #[serde(rename = "totalTokenCount")]
    total_token_count: Option<u32>,
}

/// The model's reply for one round, plus the endpoint's token count for
/// that round when it reported one.
#[derive(Debug, Clone)]
pub struct ModelReply {
    pub text: String,
    pub total_tokens: Option<u32>,
}

/// Google Gemini `generateContent` client.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Validates the credential and builds the client. A blank key is an
    /// `AuthError` before any request is made.
    pub fn new(api_key: &str, model: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(AppError::AuthError("Gemini API key is required".to_string()));
        }

        Ok(Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model
    }

    /// Sends the accumulated turns and returns the first candidate's text.
    pub async fn chat(&self, system_message: &str, turns: &[WireTurn]) -> Result<ModelReply> {
        let url = format!("{}/models/{}:generateContent", GEMINI_BASE_URL, self.model);

        let request = GenerateRequest {
            contents: turns
                .iter()
                .map(|turn| Content {
                    role: turn.role.as_str().to_string(),
                    parts: vec![Part { text: turn.text.clone() }],
                })
                .collect(),
            system_instruction: Some(SystemInstruction {
                parts: vec![Part { text: system_message.to_string() }],
            }),
        };

        tracing::debug!(model = %self.model, turns = turns.len(), "sending Gemini request");

        let response = self
            .client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::RemoteError(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = remote_error_message(&body).unwrap_or(body);
            let lowered = message.to_lowercase();

            return Err(match status.as_u16() {
                401 | 403 => AppError::AuthError(message),
                _ if looks_like_auth_failure(&lowered) => AppError::AuthError(message),
                _ => AppError::RemoteError(format!("Gemini API error ({}): {}", status, message)),
            });
        }

        let reply: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::RemoteError(format!("Failed to parse Gemini response: {}", e)))?;

        let candidate = reply
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AppError::RemoteError("No candidates returned from Gemini".to_string()))?;

        let part = candidate
            .content
            .parts
            .into_iter()
            .next()
            .ok_or_else(|| AppError::RemoteError("No content parts in Gemini response".to_string()))?;

        Ok(ModelReply {
            text: part.text,
            total_tokens: reply.usage_metadata.and_then(|u| u.total_token_count),
        })
    }
}

fn looks_like_auth_failure(lowered_message: &str) -> bool {
    ["api key", "permission", "authenticate"]
        .iter()
        .any(|marker| lowered_message.contains(marker))
}

/// Pulls `error.message` out of a Gemini error body when it is JSON.
fn remote_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value["error"]["message"].as_str().map(str::to_string)
}
