//! AI-assisted feedback drafting
//!
//! Four stateless text operations behind the [`AiDrafter`] trait:
//!
//! - draft a feedback paragraph from a manager's bullet points
//! - rephrase text to be clearer and more constructive
//! - classify sentiment into positive / neutral / negative
//! - suggest up to 3 tags from a closed vocabulary
//!
//! [`gemini::GeminiDrafter`] talks to Google's Gemini REST API;
//! [`DisabledDrafter`] is used when no API key is configured and fails
//! every call. Calls are single-shot; there is no retry.
//!
//! Model replies are free text, so parsing is done here and tested
//! independently of any provider.

use async_trait::async_trait;

use crate::models::feedback::Sentiment;

pub mod gemini;

/// Tags the model may suggest
pub const TAG_VOCABULARY: [&str; 8] = [
    "Leadership",
    "Communication",
    "Teamwork",
    "Technical Skills",
    "Problem Solving",
    "Creativity",
    "Time Management",
    "Adaptability",
];

/// Maximum number of suggested tags
pub const MAX_SUGGESTED_TAGS: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("AI drafting is not configured")]
    NotConfigured,

    #[error("AI request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI provider returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("AI provider returned an empty response")]
    EmptyResponse,

    #[error("Could not interpret AI response: {0}")]
    Unparseable(String),
}

#[async_trait]
pub trait AiDrafter: Send + Sync {
    /// Writes a constructive feedback paragraph from the given points
    async fn draft_feedback(&self, points: &str) -> Result<String, AiError>;

    async fn rephrase(&self, text: &str) -> Result<String, AiError>;

    async fn classify_sentiment(&self, text: &str) -> Result<Sentiment, AiError>;

    /// Returns at most [`MAX_SUGGESTED_TAGS`] names from [`TAG_VOCABULARY`]
    async fn suggest_tags(
        &self,
        strengths: &str,
        areas_for_improvement: &str,
    ) -> Result<Vec<String>, AiError>;
}

/// Drafter used when no provider is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledDrafter;

#[async_trait]
impl AiDrafter for DisabledDrafter {
    async fn draft_feedback(&self, _points: &str) -> Result<String, AiError> {
        Err(AiError::NotConfigured)
    }

    async fn rephrase(&self, _text: &str) -> Result<String, AiError> {
        Err(AiError::NotConfigured)
    }

    async fn classify_sentiment(&self, _text: &str) -> Result<Sentiment, AiError> {
        Err(AiError::NotConfigured)
    }

    async fn suggest_tags(
        &self,
        _strengths: &str,
        _areas_for_improvement: &str,
    ) -> Result<Vec<String>, AiError> {
        Err(AiError::NotConfigured)
    }
}

pub fn draft_prompt(points: &str) -> String {
    format!(
        "Based on the following points, write a constructive feedback paragraph for an \
         employee. The tone should be professional and encouraging. The points are: '{}'",
        points
    )
}

pub fn rephrase_prompt(text: &str) -> String {
    format!(
        "Rephrase the following text to be more professional, clear, and constructive, \
         while retaining the core message. Here is the text: '{}'",
        text
    )
}

pub fn sentiment_prompt(text: &str) -> String {
    format!(
        "Classify the overall sentiment of the following employee feedback. Answer with \
         exactly one word: positive, neutral, or negative. Feedback: '{}'",
        text
    )
}

pub fn tags_prompt(strengths: &str, areas_for_improvement: &str) -> String {
    format!(
        "Based on the following feedback content, suggest up to {} relevant tags from this \
         list: [{}]. Return only a comma-separated list of the tag names. \
         Content: 'Strengths: {}. Areas for improvement: {}.'",
        MAX_SUGGESTED_TAGS,
        TAG_VOCABULARY.join(", "),
        strengths,
        areas_for_improvement
    )
}

/// Picks the sentiment word that appears first in a model reply
pub fn parse_sentiment(reply: &str) -> Result<Sentiment, AiError> {
    let lowered = reply.to_lowercase();

    Sentiment::ALL
        .iter()
        .filter_map(|s| lowered.find(s.as_str()).map(|pos| (pos, *s)))
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, s)| s)
        .ok_or_else(|| AiError::Unparseable(format!("no sentiment in '{}'", reply.trim())))
}

/// Maps a comma-separated model reply onto the closed tag vocabulary
///
/// Matching is case-insensitive and ignores surrounding whitespace,
/// quotes and list markers. Unknown names are dropped, duplicates removed,
/// and at most [`MAX_SUGGESTED_TAGS`] names are returned in reply order.
pub fn parse_tag_suggestions(reply: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();

    for raw in reply.split([',', '\n']) {
        let candidate = raw
            .trim()
            .trim_start_matches(['-', '*'])
            .trim_matches(|c: char| c.is_whitespace() || c == '"' || c == '\'' || c == '.');

        let Some(known) = TAG_VOCABULARY
            .iter()
            .find(|t| t.eq_ignore_ascii_case(candidate))
        else {
            continue;
        };

        if !tags.iter().any(|t| t == known) {
            tags.push(known.to_string());
        }
        if tags.len() == MAX_SUGGESTED_TAGS {
            break;
        }
    }

    tags
}
