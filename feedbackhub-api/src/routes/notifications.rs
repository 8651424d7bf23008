/// Notification endpoints
///
/// - `GET /notifications` - The caller's inbox, newest first
/// - `PATCH /notifications/:id/read` - Mark one read

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use feedbackhub_shared::{
    models::{notification::Notification, user::UserIdentity},
    services::notifications,
};
use uuid::Uuid;

pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<Notification>>> {
    Ok(Json(
        notifications::list_notifications(state.store.as_ref(), &user).await?,
    ))
}

/// `404` for notifications that are missing or belong to someone else
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    notifications::mark_read(state.store.as_ref(), &user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
