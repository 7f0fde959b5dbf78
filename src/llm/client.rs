//! Gemini `generateContent` REST client.
//!
//! One POST per request: a text part (the rendered prompt), an optional inline
//! image part, and a thinking budget. The reply's text parts are concatenated
//! and returned as-is; nothing here parses the model's JSON or Mermaid output.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::llm::image::ImagePayload;

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Option<Duration>,
}

/// Reasoning tokens the model may spend before answering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThinkingBudget {
    /// Structured output (shapes, transforms): answer immediately.
    Off,
    /// Image analysis: some reasoning, bounded.
    Analysis,
}

impl ThinkingBudget {
    pub fn tokens(self) -> u32 {
        match self {
            ThinkingBudget::Off => 0,
            ThinkingBudget::Analysis => 1024,
        }
    }
}

pub struct GeminiClient {
    http: Client,
    endpoint: Url,
    model: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
enum Part<'a> {
    Text(&'a str),
    InlineData { mime_type: &'a str, data: String },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    thinking_config: ThinkingConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GeminiClient {
    pub fn new(settings: &GeminiSettings) -> Result<Self> {
        if settings.api_key.trim().is_empty() {
            return Err(AppError::Internal("GEMINI_API_KEY is not set".to_string()));
        }

        let endpoint = Url::parse(&format!(
            "{}/v1beta/models/{}:generateContent",
            settings.base_url.trim_end_matches('/'),
            settings.model
        ))
        .map_err(|e| AppError::Internal(format!("Invalid Gemini endpoint: {}", e)))?;

        let mut key = HeaderValue::from_str(settings.api_key.trim())
            .map_err(|_| AppError::Internal("Gemini API key is not a valid header".to_string()))?;
        key.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert("x-goog-api-key", key);

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            endpoint,
            model: settings.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends one prompt (plus optional image) and returns the model's raw text.
    pub async fn generate_content(
        &self,
        prompt: &str,
        image: Option<&ImagePayload>,
        budget: ThinkingBudget,
    ) -> Result<String> {
        let body = build_request(prompt, image, budget);

        let response = self.http.post(self.endpoint.clone()).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::Generation(format!("{} returned {}: {}", self.model, status, detail)));
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let text = extract_text(parsed)?;
        tracing::debug!("{} replied with {} bytes", self.model, text.len());
        Ok(text)
    }
}

fn build_request<'a>(
    prompt: &'a str,
    image: Option<&'a ImagePayload>,
    budget: ThinkingBudget,
) -> GenerateContentRequest<'a> {
    let mut parts = vec![Part::Text(prompt)];
    if let Some(image) = image {
        parts.push(Part::InlineData {
            mime_type: &image.mime_type,
            data: STANDARD.encode(&image.data),
        });
    }

    GenerateContentRequest {
        contents: vec![Content { role: "user", parts }],
        generation_config: GenerationConfig {
            thinking_config: ThinkingConfig {
                thinking_budget: budget.tokens(),
            },
        },
    }
}

fn extract_text(response: GenerateContentResponse) -> Result<String> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(AppError::Generation(format!("prompt blocked: {}", reason)));
    }

    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(AppError::Generation("no candidates returned".to_string()));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter(|part| !part.thought)
        .filter_map(|part| part.text)
        .collect();

    if text.trim().is_empty() {
        return Err(AppError::Generation(format!(
            "empty reply (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }
    Ok(text)
}
