/// Feedback endpoints
///
/// Visibility and ownership are enforced by the feedback service: managers
/// see what they wrote, employees what they received, and only the author
/// may change or delete an entry.
///
/// # Endpoints
///
/// - `POST /feedback` - Give feedback (manager)
/// - `GET /feedback` - Feedback given or received, newest first
/// - `GET /feedback/:id` - One entry (parties only)
/// - `PUT /feedback/:id` - Partial update (author)
/// - `DELETE /feedback/:id` - Delete (author)
/// - `PATCH /feedback/:id/acknowledge` - Acknowledge (recipient)
/// - `POST /feedback/request` - Ask the team manager for feedback (employee)
/// - `POST /feedback/:id/comments` - Comment (parties only)
/// - `GET /feedback/:id/comments` - Comment thread (parties only)
/// - `GET /feedback/export/pdf` - PDF report of the caller's feedback

use crate::{
    app::AppState,
    error::{validate, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use feedbackhub_shared::{
    models::{
        comment::CommentDetails,
        feedback::{FeedbackChanges, FeedbackDetails, Sentiment},
        user::UserIdentity,
    },
    services::feedback::{self as service, FeedbackInput},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create feedback request
#[derive(Debug, Deserialize)]
pub struct CreateFeedbackRequest {
    pub employee_id: Uuid,
    pub strengths: Option<String>,
    pub areas_for_improvement: Option<String>,
    pub sentiment: Option<Sentiment>,

    /// Existing tag ids
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,

    /// Tag names, created when missing
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Comment request
#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1, max = 2000, message = "Comment must be 1 to 2000 characters"))]
    pub content: String,
}

/// Generic acknowledgement body
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// # Errors
///
/// - `400 Bad Request`: Target is not an employee, or unknown tag id
/// - `403 Forbidden`: Caller is not a manager, or the employee is not in their team
/// - `404 Not Found`: Unknown employee
pub async fn create_feedback(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(req): Json<CreateFeedbackRequest>,
) -> ApiResult<(StatusCode, Json<FeedbackDetails>)> {
    let feedback = service::create_feedback(
        state.store.as_ref(),
        &user,
        FeedbackInput {
            employee_id: req.employee_id,
            strengths: req.strengths,
            areas_for_improvement: req.areas_for_improvement,
            sentiment: req.sentiment,
            tag_ids: req.tag_ids,
            tag_names: req.tags,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(feedback)))
}

pub async fn list_feedback(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<FeedbackDetails>>> {
    Ok(Json(service::list_feedback(state.store.as_ref(), &user).await?))
}

pub async fn get_feedback(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<FeedbackDetails>> {
    Ok(Json(service::get_feedback(state.store.as_ref(), &user, id).await?))
}

/// Partial update
///
/// Omitted fields keep their value. `tag_ids`, when present, replaces the
/// tag set; an empty list clears it.
pub async fn update_feedback(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<Uuid>,
    Json(changes): Json<FeedbackChanges>,
) -> ApiResult<Json<FeedbackDetails>> {
    let feedback = service::update_feedback(state.store.as_ref(), &user, id, changes).await?;
    Ok(Json(feedback))
}

pub async fn delete_feedback(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    service::delete_feedback(state.store.as_ref(), &user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Idempotent; the manager is notified on every call
pub async fn acknowledge_feedback(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<FeedbackDetails>> {
    let feedback = service::acknowledge_feedback(state.store.as_ref(), &user, id).await?;
    Ok(Json(feedback))
}

pub async fn request_feedback(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    service::request_feedback(state.store.as_ref(), &user).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse {
            message: "Feedback request sent to your manager".to_string(),
        }),
    ))
}

pub async fn add_comment(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<Uuid>,
    Json(req): Json<CommentRequest>,
) -> ApiResult<(StatusCode, Json<CommentDetails>)> {
    validate(&req)?;

    let comment = service::add_comment(state.store.as_ref(), &user, id, &req.content).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn list_comments(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<CommentDetails>>> {
    Ok(Json(service::list_comments(state.store.as_ref(), &user, id).await?))
}

/// Streams the caller's feedback as `feedback_report.pdf`
///
/// # Errors
///
/// - `404 Not Found`: The caller has no feedback
/// - `502 Bad Gateway`: Rendering failed
pub async fn export_pdf(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<impl IntoResponse> {
    let pdf = service::export_report(state.store.as_ref(), &user).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"feedback_report.pdf\"",
            ),
        ],
        pdf,
    ))
}
