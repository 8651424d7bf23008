/// Team endpoints
///
/// # Endpoints
///
/// - `GET /teams` - Public team directory
/// - `POST /teams` - Create the caller's team (manager)
/// - `GET /teams/me` - The caller's team with members (manager)
/// - `GET /teams/me/stats` - Sentiment counts for the caller's team (manager)
/// - `POST /teams/me/members/:user_id` - Add an employee to the caller's team
/// - `POST /teams/:team_id/members/:user_id` - Add an employee to a team the caller manages

use crate::{
    app::AppState,
    error::{validate, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use feedbackhub_shared::{
    models::{
        feedback::SentimentCount,
        team::{Team, TeamDetails, TeamSummary},
        user::UserIdentity,
    },
    services::teams,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Create team request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTeamRequest {
    #[validate(length(min = 1, max = 100, message = "Team name must be 1 to 100 characters"))]
    pub name: String,
}

pub async fn list_teams(State(state): State<AppState>) -> ApiResult<Json<Vec<TeamSummary>>> {
    Ok(Json(teams::list_teams(state.store.as_ref()).await?))
}

/// # Errors
///
/// - `403 Forbidden`: Caller is not a manager
/// - `409 Conflict`: Caller already manages a team
pub async fn create_team(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(req): Json<CreateTeamRequest>,
) -> ApiResult<(StatusCode, Json<Team>)> {
    validate(&req)?;

    let team = teams::create_team(state.store.as_ref(), &user, &req.name).await?;
    Ok((StatusCode::CREATED, Json(team)))
}

pub async fn my_team(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<TeamDetails>> {
    Ok(Json(teams::my_team(state.store.as_ref(), &user).await?))
}

pub async fn team_stats(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<SentimentCount>>> {
    Ok(Json(teams::team_stats(state.store.as_ref(), &user).await?))
}

/// # Errors
///
/// - `400 Bad Request`: Target is not an employee
/// - `403 Forbidden`: Caller does not manage the team
/// - `404 Not Found`: Unknown user
/// - `409 Conflict`: Employee already belongs to a team
pub async fn add_member(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((team_id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<UserIdentity>> {
    let member = teams::add_member(state.store.as_ref(), &user, team_id, user_id).await?;
    Ok(Json(member))
}

pub async fn add_member_to_own_team(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<UserIdentity>> {
    let member = teams::add_member_to_own_team(state.store.as_ref(), &user, user_id).await?;
    Ok(Json(member))
}
