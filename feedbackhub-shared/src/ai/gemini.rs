//! Gemini `generateContent` client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{
    draft_prompt, parse_sentiment, parse_tag_suggestions, rephrase_prompt, sentiment_prompt,
    tags_prompt, AiDrafter, AiError,
};
use crate::models::feedback::Sentiment;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration for the Gemini client
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,

    /// Model name (default: gemini-1.5-flash)
    pub model: String,

    /// API root without trailing slash
    pub base_url: String,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

pub struct GeminiDrafter {
    config: GeminiConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .find_map(|p| p.text)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

impl GeminiDrafter {
    pub fn new(config: GeminiConfig) -> Result<Self, AiError> {
        if config.api_key.is_empty() {
            return Err(AiError::NotConfigured);
        }

        Ok(Self {
            config,
            client: reqwest::Client::new(),
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    async fn call_api(&self, prompt: &str) -> Result<String, AiError> {
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        debug!(model = %self.config.model, "Calling Gemini API");

        let response = self
            .client
            .post(self.config.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Gemini API error");
            return Err(AiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: GenerateResponse = response.json().await?;
        body.first_text().ok_or(AiError::EmptyResponse)
    }
}

#[async_trait]
impl AiDrafter for GeminiDrafter {
    async fn draft_feedback(&self, points: &str) -> Result<String, AiError> {
        self.call_api(&draft_prompt(points)).await
    }

    async fn rephrase(&self, text: &str) -> Result<String, AiError> {
        self.call_api(&rephrase_prompt(text)).await
    }

    async fn classify_sentiment(&self, text: &str) -> Result<Sentiment, AiError> {
        let reply = self.call_api(&sentiment_prompt(text)).await?;
        parse_sentiment(&reply)
    }

    async fn suggest_tags(
        &self,
        strengths: &str,
        areas_for_improvement: &str,
    ) -> Result<Vec<String>, AiError> {
        let reply = self
            .call_api(&tags_prompt(strengths, areas_for_improvement))
            .await?;
        Ok(parse_tag_suggestions(&reply))
    }
}
