//! Feedback lifecycle: create, read, update, acknowledge, delete, comment,
//! request and export
//!
//! Ownership rules are enforced twice. The service checks them first to
//! produce precise errors, and the store write carries the same condition
//! (acting user id in the WHERE clause) so a concurrent change between the
//! check and the write cannot be exploited.

use tracing::info;
use uuid::Uuid;

use super::error::{ServiceError, ServiceResult};
use super::notifications::notify;
use super::tags;
use crate::auth::authorization::{
    require_author, require_employee, require_manager, require_party, require_recipient,
};
use crate::models::comment::{CommentDetails, NewComment, MAX_COMMENT_LENGTH};
use crate::models::feedback::{
    Feedback, FeedbackChanges, FeedbackDetails, FeedbackScope, NewFeedback, Sentiment,
};
use crate::models::user::{Role, UserIdentity};
use crate::report::render_feedback_report;
use crate::store::Store;

/// Feedback creation request
#[derive(Debug, Clone, Default)]
pub struct FeedbackInput {
    pub employee_id: Uuid,
    pub strengths: Option<String>,
    pub areas_for_improvement: Option<String>,
    pub sentiment: Option<Sentiment>,
    /// Existing tags to attach
    pub tag_ids: Vec<Uuid>,
    /// Tag names, created on demand
    pub tag_names: Vec<String>,
}

fn scope_for(actor: &UserIdentity) -> FeedbackScope {
    match actor.role {
        Role::Manager => FeedbackScope::WrittenBy(actor.id),
        Role::Employee => FeedbackScope::ReceivedBy(actor.id),
    }
}

fn not_in_team() -> ServiceError {
    ServiceError::Forbidden("Can only give feedback to employees in your team".to_string())
}

async fn load(store: &dyn Store, feedback_id: Uuid) -> ServiceResult<Feedback> {
    store
        .find_feedback(feedback_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Feedback"))
}

async fn load_details(store: &dyn Store, feedback_id: Uuid) -> ServiceResult<FeedbackDetails> {
    store
        .feedback_details(feedback_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Feedback"))
}

/// Writes feedback about an employee of the caller's team
///
/// # Errors
///
/// - `Forbidden`: caller is not a manager, or the employee is not in their team
/// - `NotFound`: employee does not exist
/// - `Validation`: target is not an employee, or a tag id is unknown
pub async fn create_feedback(
    store: &dyn Store,
    actor: &UserIdentity,
    input: FeedbackInput,
) -> ServiceResult<FeedbackDetails> {
    require_manager(actor)?;

    let employee = store
        .find_user(input.employee_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Employee"))?;
    if employee.role != Role::Employee {
        return Err(ServiceError::Validation(
            "Feedback can only be given to employees".to_string(),
        ));
    }

    // Membership before tags, so a rejected create writes nothing. The
    // insert re-checks it atomically.
    let in_team = match employee.team_id {
        Some(team_id) => store
            .find_team(team_id)
            .await?
            .is_some_and(|team| team.manager_id == actor.id),
        None => false,
    };
    if !in_team {
        return Err(not_in_team());
    }

    let mut tag_ids = tags::resolve_ids(store, &input.tag_ids).await?;
    for tag in tags::get_or_create(store, &input.tag_names).await? {
        if !tag_ids.contains(&tag.id) {
            tag_ids.push(tag.id);
        }
    }

    let feedback = store
        .create_feedback(NewFeedback {
            employee_id: employee.id,
            manager_id: actor.id,
            strengths: input.strengths,
            areas_for_improvement: input.areas_for_improvement,
            sentiment: input.sentiment,
            tag_ids,
        })
        .await?
        .ok_or_else(not_in_team)?;

    info!(feedback_id = %feedback.id, manager_id = %actor.id, employee_id = %employee.id, "Feedback created");
    notify(
        store,
        employee.id,
        &format!("{} has given you new feedback.", actor.full_name),
    )
    .await;

    load_details(store, feedback.id).await
}

/// Feedback the caller wrote (managers) or received (employees), newest first
pub async fn list_feedback(
    store: &dyn Store,
    actor: &UserIdentity,
) -> ServiceResult<Vec<FeedbackDetails>> {
    Ok(store.list_feedback(scope_for(actor)).await?)
}

/// A single feedback record, visible to its two parties only
pub async fn get_feedback(
    store: &dyn Store,
    actor: &UserIdentity,
    feedback_id: Uuid,
) -> ServiceResult<FeedbackDetails> {
    let feedback = load(store, feedback_id).await?;
    require_party(actor, &feedback)?;

    load_details(store, feedback_id).await
}

/// Applies a partial update; only the authoring manager may do this
///
/// `changes.tag_ids` replaces the tag set when present.
pub async fn update_feedback(
    store: &dyn Store,
    actor: &UserIdentity,
    feedback_id: Uuid,
    mut changes: FeedbackChanges,
) -> ServiceResult<FeedbackDetails> {
    require_manager(actor)?;

    let feedback = load(store, feedback_id).await?;
    require_author(actor, &feedback)?;

    if let Some(ids) = changes.tag_ids.take() {
        changes.tag_ids = Some(tags::resolve_ids(store, &ids).await?);
    }

    store
        .update_feedback(feedback_id, actor.id, changes)
        .await?
        .ok_or_else(|| ServiceError::not_found("Feedback"))?;

    info!(%feedback_id, manager_id = %actor.id, "Feedback updated");
    load_details(store, feedback_id).await
}

/// Marks feedback acknowledged by its recipient
///
/// Idempotent on the flag. Every call notifies the manager, so acknowledging
/// twice produces two notifications.
pub async fn acknowledge_feedback(
    store: &dyn Store,
    actor: &UserIdentity,
    feedback_id: Uuid,
) -> ServiceResult<FeedbackDetails> {
    let feedback = load(store, feedback_id).await?;
    require_recipient(actor, &feedback)?;

    let feedback = store
        .acknowledge_feedback(feedback_id, actor.id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Feedback"))?;

    info!(%feedback_id, employee_id = %actor.id, "Feedback acknowledged");
    notify(
        store,
        feedback.manager_id,
        &format!("{} has acknowledged your feedback.", actor.full_name),
    )
    .await;

    load_details(store, feedback_id).await
}

/// Deletes feedback together with its comments and tag links
pub async fn delete_feedback(
    store: &dyn Store,
    actor: &UserIdentity,
    feedback_id: Uuid,
) -> ServiceResult<()> {
    require_manager(actor)?;

    let feedback = load(store, feedback_id).await?;
    require_author(actor, &feedback)?;

    if !store.delete_feedback(feedback_id, actor.id).await? {
        return Err(ServiceError::not_found("Feedback"));
    }

    info!(%feedback_id, manager_id = %actor.id, "Feedback deleted");
    Ok(())
}

/// Asks the manager of the caller's team for feedback
///
/// # Errors
///
/// - `Forbidden`: caller is not an employee
/// - `Validation`: caller is not in a team
pub async fn request_feedback(store: &dyn Store, actor: &UserIdentity) -> ServiceResult<()> {
    require_employee(actor)?;

    let team_id = actor.team_id.ok_or_else(|| {
        ServiceError::Validation("You are not assigned to a team".to_string())
    })?;
    let team = store
        .find_team(team_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Team"))?;

    notify(
        store,
        team.manager_id,
        &format!("{} has requested feedback.", actor.full_name),
    )
    .await;

    info!(employee_id = %actor.id, manager_id = %team.manager_id, "Feedback requested");
    Ok(())
}

/// Adds a comment by one of the parties and notifies the other one
pub async fn add_comment(
    store: &dyn Store,
    actor: &UserIdentity,
    feedback_id: Uuid,
    content: &str,
) -> ServiceResult<CommentDetails> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ServiceError::Validation("Comment must not be empty".to_string()));
    }
    if content.chars().count() > MAX_COMMENT_LENGTH {
        return Err(ServiceError::Validation(format!(
            "Comment must be at most {} characters",
            MAX_COMMENT_LENGTH
        )));
    }

    let feedback = load(store, feedback_id).await?;
    require_party(actor, &feedback)?;

    let comment = store
        .add_comment(NewComment {
            feedback_id,
            user_id: actor.id,
            content: content.to_string(),
        })
        .await?;

    notify(
        store,
        feedback.counterpart(actor.id),
        &format!("{} commented on your feedback.", actor.full_name),
    )
    .await;

    Ok(CommentDetails {
        id: comment.id,
        content: comment.content,
        created_at: comment.created_at,
        user: actor.clone(),
    })
}

/// Comment thread of a feedback record, oldest first
pub async fn list_comments(
    store: &dyn Store,
    actor: &UserIdentity,
    feedback_id: Uuid,
) -> ServiceResult<Vec<CommentDetails>> {
    let feedback = load(store, feedback_id).await?;
    require_party(actor, &feedback)?;

    Ok(store.list_comments(feedback_id).await?)
}

/// Renders the caller's feedback list as a PDF
///
/// # Errors
///
/// - `NotFound`: the caller has no feedback
/// - `Upstream`: rendering failed
pub async fn export_report(store: &dyn Store, actor: &UserIdentity) -> ServiceResult<Vec<u8>> {
    let feedback = list_feedback(store, actor).await?;
    if feedback.is_empty() {
        return Err(ServiceError::NotFound("No feedback found to export.".to_string()));
    }

    let pdf = render_feedback_report(&feedback)?;
    info!(user_id = %actor.id, records = feedback.len(), bytes = pdf.len(), "Feedback report rendered");

    Ok(pdf)
}
