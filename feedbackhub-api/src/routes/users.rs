/// User endpoints
///
/// - `GET /users/me` - The authenticated user
/// - `GET /users/employees` - Employees not yet assigned to a team

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use feedbackhub_shared::{models::user::UserIdentity, services::teams};

pub async fn me(Extension(user): Extension<UserIdentity>) -> Json<UserIdentity> {
    Json(user)
}

pub async fn unassigned_employees(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<UserIdentity>>> {
    let employees = teams::unassigned_employees(state.store.as_ref()).await?;
    Ok(Json(employees))
}
