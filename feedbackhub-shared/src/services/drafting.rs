//! AI-assisted feedback composition
//!
//! Thin orchestration over an [`AiDrafter`]: input checks, role gates, and
//! mapping provider failures onto `Upstream`.

use serde::Serialize;
use tracing::info;

use super::error::{ServiceError, ServiceResult};
use crate::ai::AiDrafter;
use crate::auth::authorization::require_manager;
use crate::models::feedback::Sentiment;
use crate::models::user::UserIdentity;

/// Maximum prompt length accepted for drafting
pub const MAX_PROMPT_LENGTH: usize = 4000;

/// Draft text with the sentiment and tags the model assigned to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFeedback {
    pub text: String,
    pub sentiment: Sentiment,
    pub tags: Vec<String>,
}

fn require_text<'a>(field: &str, value: &'a str) -> ServiceResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ServiceError::Validation(format!("{} must not be empty", field)));
    }
    if value.chars().count() > MAX_PROMPT_LENGTH {
        return Err(ServiceError::Validation(format!(
            "{} must be at most {} characters",
            field, MAX_PROMPT_LENGTH
        )));
    }
    Ok(value)
}

/// Writes a feedback paragraph from the caller's bullet points
pub async fn suggest_feedback(
    ai: &dyn AiDrafter,
    _actor: &UserIdentity,
    prompt: &str,
) -> ServiceResult<String> {
    let prompt = require_text("Prompt", prompt)?;
    Ok(ai.draft_feedback(prompt).await?)
}

pub async fn rephrase(ai: &dyn AiDrafter, _actor: &UserIdentity, text: &str) -> ServiceResult<String> {
    let text = require_text("Text", text)?;
    Ok(ai.rephrase(text).await?)
}

/// Suggests up to three vocabulary tags for a feedback draft (managers only)
pub async fn suggest_tags(
    ai: &dyn AiDrafter,
    actor: &UserIdentity,
    strengths: &str,
    areas_for_improvement: &str,
) -> ServiceResult<Vec<String>> {
    require_manager(actor)?;

    if strengths.trim().is_empty() && areas_for_improvement.trim().is_empty() {
        return Err(ServiceError::Validation(
            "Strengths or areas for improvement must be provided".to_string(),
        ));
    }

    Ok(ai
        .suggest_tags(strengths.trim(), areas_for_improvement.trim())
        .await?)
}

/// Drafts feedback, then classifies and tags the draft (managers only)
///
/// Three sequential provider calls; the first failure aborts the whole
/// operation.
pub async fn generate_feedback(
    ai: &dyn AiDrafter,
    actor: &UserIdentity,
    prompt: &str,
) -> ServiceResult<GeneratedFeedback> {
    require_manager(actor)?;
    let prompt = require_text("Prompt", prompt)?;

    let text = ai.draft_feedback(prompt).await?;
    let sentiment = ai.classify_sentiment(&text).await?;
    let tags = ai.suggest_tags(&text, "").await?;

    info!(manager_id = %actor.id, %sentiment, tags = tags.len(), "Feedback generated");

    Ok(GeneratedFeedback {
        text,
        sentiment,
        tags,
    })
}
