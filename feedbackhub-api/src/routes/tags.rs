/// Tag endpoints
///
/// - `GET /tags` - All tags, ordered by name
/// - `POST /tags` - Get-or-create tags by name (manager)

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use feedbackhub_shared::{
    auth::authorization::require_manager,
    models::{tag::Tag, user::UserIdentity},
    services::tags,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateTagsRequest {
    pub names: Vec<String>,
}

pub async fn list_tags(State(state): State<AppState>) -> ApiResult<Json<Vec<Tag>>> {
    Ok(Json(tags::list_tags(state.store.as_ref()).await?))
}

/// Returns one tag per distinct name; existing names keep their id
pub async fn create_tags(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(req): Json<CreateTagsRequest>,
) -> ApiResult<Json<Vec<Tag>>> {
    require_manager(&user)?;

    Ok(Json(tags::get_or_create(state.store.as_ref(), &req.names).await?))
}
