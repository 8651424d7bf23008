/// Persistence boundary for FeedbackHub
///
/// Services talk to storage only through the [`Store`] trait. Two
/// implementations exist:
///
/// - [`postgres::PgStore`]: production backend, delegating to the SQL in
///   [`crate::models`]
/// - [`memory::MemoryStore`]: in-process backend for tests and local runs,
///   with knobs to inject failures
///
/// Operations that must be atomic under concurrency (team creation,
/// employee assignment, tag get-or-create, guarded feedback writes) are
/// single trait methods so each backend can make them atomic its own way.
///
/// # Example
///
/// ```
/// use feedbackhub_shared::store::{memory::MemoryStore, Store};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let tags = store.get_or_create_tags(&["Leadership".to_string()]).await?;
/// assert_eq!(tags.len(), 1);
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::comment::{Comment, CommentDetails, NewComment};
use crate::models::feedback::{
    Feedback, FeedbackChanges, FeedbackDetails, FeedbackScope, NewFeedback, SentimentCount,
};
use crate::models::notification::Notification;
use crate::models::tag::Tag;
use crate::models::team::{AssignOutcome, Team, TeamSummary};
use crate::models::user::{NewUser, User};

pub mod memory;
pub mod postgres;

/// Errors raised by store backends
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness rule was violated; carries the constraint name
    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    /// A write referenced a row that does not exist
    #[error("Referenced record does not exist: {0}")]
    MissingReference(String),

    #[error("Database error: {0}")]
    Database(String),

    /// Injected or backend-specific failure
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();
            if db_err.is_unique_violation() {
                return StoreError::Conflict(constraint);
            }
            if db_err.is_foreign_key_violation() {
                return StoreError::MissingReference(constraint);
            }
        }

        StoreError::Database(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage operations needed by the services
#[async_trait]
pub trait Store: Send + Sync {
    /// Short backend name for health reporting
    fn backend_tag(&self) -> &'static str;

    async fn ping(&self) -> StoreResult<()>;

    // Users

    /// Fails with `Conflict` if the email is taken
    async fn create_user(&self, data: NewUser) -> StoreResult<User>;
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn delete_user(&self, id: Uuid) -> StoreResult<bool>;
    /// Unconditionally links a user to a team
    async fn set_user_team(&self, user_id: Uuid, team_id: Uuid) -> StoreResult<Option<User>>;
    async fn list_unassigned_employees(&self) -> StoreResult<Vec<User>>;
    async fn list_team_members(&self, team_id: Uuid) -> StoreResult<Vec<User>>;

    // Teams

    /// Fails with `Conflict` if the manager already owns a team
    async fn create_team(&self, name: &str, manager_id: Uuid) -> StoreResult<Team>;
    async fn find_team(&self, id: Uuid) -> StoreResult<Option<Team>>;
    async fn find_team_by_manager(&self, manager_id: Uuid) -> StoreResult<Option<Team>>;
    async fn list_teams(&self) -> StoreResult<Vec<TeamSummary>>;
    async fn delete_team(&self, id: Uuid) -> StoreResult<bool>;
    /// Atomically places an employee into a team owned by `manager_id`
    async fn assign_employee(
        &self,
        team_id: Uuid,
        manager_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<AssignOutcome>;
    async fn team_sentiment_counts(&self, manager_id: Uuid) -> StoreResult<Vec<SentimentCount>>;

    // Feedback

    /// Returns `None` if the employee is not in the manager's team at the
    /// moment of writing
    async fn create_feedback(&self, data: NewFeedback) -> StoreResult<Option<Feedback>>;
    async fn find_feedback(&self, id: Uuid) -> StoreResult<Option<Feedback>>;
    async fn feedback_details(&self, id: Uuid) -> StoreResult<Option<FeedbackDetails>>;
    /// Newest first
    async fn list_feedback(&self, scope: FeedbackScope) -> StoreResult<Vec<FeedbackDetails>>;
    /// Returns `None` unless the feedback exists and was written by `manager_id`
    async fn update_feedback(
        &self,
        id: Uuid,
        manager_id: Uuid,
        changes: FeedbackChanges,
    ) -> StoreResult<Option<Feedback>>;
    /// Returns `None` unless the feedback exists and is about `employee_id`
    async fn acknowledge_feedback(
        &self,
        id: Uuid,
        employee_id: Uuid,
    ) -> StoreResult<Option<Feedback>>;
    async fn delete_feedback(&self, id: Uuid, manager_id: Uuid) -> StoreResult<bool>;

    // Comments

    async fn add_comment(&self, data: NewComment) -> StoreResult<Comment>;
    /// Oldest first
    async fn list_comments(&self, feedback_id: Uuid) -> StoreResult<Vec<CommentDetails>>;

    // Tags

    /// Returns one tag per distinct name, creating missing ones
    async fn get_or_create_tags(&self, names: &[String]) -> StoreResult<Vec<Tag>>;
    async fn find_tags(&self, ids: &[Uuid]) -> StoreResult<Vec<Tag>>;
    async fn list_tags(&self) -> StoreResult<Vec<Tag>>;

    // Notifications

    async fn create_notification(&self, user_id: Uuid, message: &str) -> StoreResult<Notification>;
    /// Newest first
    async fn list_notifications(&self, user_id: Uuid) -> StoreResult<Vec<Notification>>;
    async fn mark_notification_read(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<Notification>>;
}
