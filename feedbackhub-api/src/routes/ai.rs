/// AI drafting endpoints
///
/// All calls are forwarded once to the configured provider. Without a
/// provider, or when it fails, the response is `502 Bad Gateway`.
///
/// - `POST /ai/suggest-feedback` - Draft a paragraph from bullet points
/// - `POST /ai/rephrase` - Rephrase text constructively
/// - `POST /ai/suggest-tags` - Up to three vocabulary tags (manager)
/// - `POST /ai/generate-feedback` - Draft plus sentiment and tags (manager)

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use feedbackhub_shared::{
    models::user::UserIdentity,
    services::drafting::{self, GeneratedFeedback},
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PromptRequest {
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct RephraseRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct SuggestTagsRequest {
    #[serde(default)]
    pub strengths: String,
    #[serde(default)]
    pub areas_for_improvement: String,
}

pub async fn suggest_feedback(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(req): Json<PromptRequest>,
) -> ApiResult<Json<String>> {
    Ok(Json(
        drafting::suggest_feedback(state.ai.as_ref(), &user, &req.prompt).await?,
    ))
}

pub async fn rephrase(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(req): Json<RephraseRequest>,
) -> ApiResult<Json<String>> {
    Ok(Json(
        drafting::rephrase(state.ai.as_ref(), &user, &req.text).await?,
    ))
}

pub async fn suggest_tags(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(req): Json<SuggestTagsRequest>,
) -> ApiResult<Json<Vec<String>>> {
    let tags = drafting::suggest_tags(
        state.ai.as_ref(),
        &user,
        &req.strengths,
        &req.areas_for_improvement,
    )
    .await?;

    Ok(Json(tags))
}

pub async fn generate_feedback(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(req): Json<PromptRequest>,
) -> ApiResult<Json<GeneratedFeedback>> {
    Ok(Json(
        drafting::generate_feedback(state.ai.as_ref(), &user, &req.prompt).await?,
    ))
}
