/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /auth/register` - Register a user (managers also get a team)
/// - `POST /auth/login` - Exchange credentials for an access token

use crate::{
    app::AppState,
    error::{validate, ApiResult},
};
use axum::{extract::State, http::StatusCode, Json};
use feedbackhub_shared::{
    models::user::{Role, UserIdentity},
    services::registration::{self, Registration},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Display name
    #[validate(length(min = 1, max = 100, message = "Full name must be 1 to 100 characters"))]
    pub full_name: String,

    /// Password (will be validated for strength)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    pub role: Role,

    /// Required for managers
    #[validate(length(min = 1, max = 100, message = "Team name must be 1 to 100 characters"))]
    pub team_name: Option<String>,

    /// Optional for employees
    pub team_id: Option<Uuid>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Access token
    pub access_token: String,

    /// Always "bearer"
    pub token_type: String,
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /auth/register
/// Content-Type: application/json
///
/// {
///   "email": "maria@example.com",
///   "full_name": "Maria Lopez",
///   "password": "SecureP@ss123",
///   "role": "manager",
///   "team_name": "Platform"
/// }
/// ```
///
/// # Response
///
/// `201 Created` with the public user record.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed (including a manager without `team_name`)
/// - `404 Not Found`: `team_id` does not exist
/// - `409 Conflict`: Email already exists
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserIdentity>)> {
    validate(&req)?;

    let user = registration::register(
        state.store.as_ref(),
        Registration {
            email: req.email,
            full_name: req.full_name,
            password: req.password,
            role: req.role,
            team_name: req.team_name,
            team_id: req.team_id,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /auth/login
/// Content-Type: application/json
///
/// {
///   "email": "maria@example.com",
///   "password": "SecureP@ss123"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "access_token": "eyJ...",
///   "token_type": "bearer"
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown email or wrong password
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    validate(&req)?;

    let access_token = registration::login(
        state.store.as_ref(),
        &req.email,
        &req.password,
        state.jwt_secret(),
        state.config.token_lifetime(),
    )
    .await?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}
