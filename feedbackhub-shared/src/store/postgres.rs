/// PostgreSQL-backed [`Store`]
///
/// Delegates to the model operations and assembles the joined views
/// (feedback details, comment threads) from a handful of batched queries.

use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::instrument;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::db::pool::health_check;
use crate::models::comment::{Comment, CommentDetails, NewComment};
use crate::models::feedback::{
    Feedback, FeedbackChanges, FeedbackDetails, FeedbackScope, NewFeedback, SentimentCount,
};
use crate::models::notification::Notification;
use crate::models::tag::Tag;
use crate::models::team::{AssignOutcome, Team, TeamSummary};
use crate::models::user::{NewUser, User, UserIdentity};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Resolves parties, tags and comments for a batch of feedback rows
    async fn hydrate(&self, rows: Vec<Feedback>) -> StoreResult<Vec<FeedbackDetails>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let feedback_ids: Vec<Uuid> = rows.iter().map(|f| f.id).collect();
        let mut user_ids: Vec<Uuid> = rows
            .iter()
            .flat_map(|f| [f.employee_id, f.manager_id])
            .collect();
        user_ids.sort();
        user_ids.dedup();

        let users: HashMap<Uuid, UserIdentity> = User::find_many(&self.pool, &user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.identity()))
            .collect();

        let mut tags: HashMap<Uuid, Vec<Tag>> = HashMap::new();
        for link in Tag::for_feedback(&self.pool, &feedback_ids).await? {
            tags.entry(link.feedback_id).or_default().push(link.into_tag());
        }

        let mut comments: HashMap<Uuid, Vec<CommentDetails>> = HashMap::new();
        for (feedback_id, comment) in Comment::details_for_feedback(&self.pool, &feedback_ids).await?
        {
            comments.entry(feedback_id).or_default().push(comment);
        }

        Ok(FeedbackDetails::assemble(rows, &users, tags, comments))
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend_tag(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> StoreResult<()> {
        health_check(&self.pool).await?;
        Ok(())
    }

    #[instrument(skip(self, data), fields(email = %data.email, role = %data.role))]
    async fn create_user(&self, data: NewUser) -> StoreResult<User> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        Ok(User::delete(&self.pool, id).await?)
    }

    async fn set_user_team(&self, user_id: Uuid, team_id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::set_team(&self.pool, user_id, team_id).await?)
    }

    async fn list_unassigned_employees(&self) -> StoreResult<Vec<User>> {
        Ok(User::list_unassigned_employees(&self.pool).await?)
    }

    async fn list_team_members(&self, team_id: Uuid) -> StoreResult<Vec<User>> {
        Ok(User::list_by_team(&self.pool, team_id).await?)
    }

    #[instrument(skip(self))]
    async fn create_team(&self, name: &str, manager_id: Uuid) -> StoreResult<Team> {
        Team::create(&self.pool, name, manager_id)
            .await?
            .ok_or_else(|| StoreError::Conflict("teams_manager_id_key".to_string()))
    }

    async fn find_team(&self, id: Uuid) -> StoreResult<Option<Team>> {
        Ok(Team::find_by_id(&self.pool, id).await?)
    }

    async fn find_team_by_manager(&self, manager_id: Uuid) -> StoreResult<Option<Team>> {
        Ok(Team::find_by_manager(&self.pool, manager_id).await?)
    }

    async fn list_teams(&self) -> StoreResult<Vec<TeamSummary>> {
        Ok(Team::list(&self.pool).await?)
    }

    async fn delete_team(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Team::delete(&self.pool, id).await?)
    }

    #[instrument(skip(self))]
    async fn assign_employee(
        &self,
        team_id: Uuid,
        manager_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<AssignOutcome> {
        Ok(Team::assign_employee(&self.pool, team_id, manager_id, user_id).await?)
    }

    async fn team_sentiment_counts(&self, manager_id: Uuid) -> StoreResult<Vec<SentimentCount>> {
        Ok(Team::sentiment_counts(&self.pool, manager_id).await?)
    }

    #[instrument(skip(self, data), fields(manager_id = %data.manager_id, employee_id = %data.employee_id))]
    async fn create_feedback(&self, data: NewFeedback) -> StoreResult<Option<Feedback>> {
        Ok(Feedback::create(&self.pool, data).await?)
    }

    async fn find_feedback(&self, id: Uuid) -> StoreResult<Option<Feedback>> {
        Ok(Feedback::find_by_id(&self.pool, id).await?)
    }

    async fn feedback_details(&self, id: Uuid) -> StoreResult<Option<FeedbackDetails>> {
        let Some(row) = Feedback::find_by_id(&self.pool, id).await? else {
            return Ok(None);
        };

        Ok(self.hydrate(vec![row]).await?.pop())
    }

    async fn list_feedback(&self, scope: FeedbackScope) -> StoreResult<Vec<FeedbackDetails>> {
        let rows = Feedback::list(&self.pool, scope).await?;
        self.hydrate(rows).await
    }

    async fn update_feedback(
        &self,
        id: Uuid,
        manager_id: Uuid,
        changes: FeedbackChanges,
    ) -> StoreResult<Option<Feedback>> {
        Ok(Feedback::update(&self.pool, id, manager_id, changes).await?)
    }

    async fn acknowledge_feedback(
        &self,
        id: Uuid,
        employee_id: Uuid,
    ) -> StoreResult<Option<Feedback>> {
        Ok(Feedback::acknowledge(&self.pool, id, employee_id).await?)
    }

    async fn delete_feedback(&self, id: Uuid, manager_id: Uuid) -> StoreResult<bool> {
        Ok(Feedback::delete(&self.pool, id, manager_id).await?)
    }

    async fn add_comment(&self, data: NewComment) -> StoreResult<Comment> {
        Ok(Comment::create(&self.pool, data).await?)
    }

    async fn list_comments(&self, feedback_id: Uuid) -> StoreResult<Vec<CommentDetails>> {
        let comments = Comment::details_for_feedback(&self.pool, &[feedback_id]).await?;
        Ok(comments.into_iter().map(|(_, c)| c).collect())
    }

    async fn get_or_create_tags(&self, names: &[String]) -> StoreResult<Vec<Tag>> {
        Ok(Tag::get_or_create(&self.pool, names).await?)
    }

    async fn find_tags(&self, ids: &[Uuid]) -> StoreResult<Vec<Tag>> {
        Ok(Tag::find_many(&self.pool, ids).await?)
    }

    async fn list_tags(&self) -> StoreResult<Vec<Tag>> {
        Ok(Tag::list(&self.pool).await?)
    }

    async fn create_notification(&self, user_id: Uuid, message: &str) -> StoreResult<Notification> {
        Ok(Notification::create(&self.pool, user_id, message).await?)
    }

    async fn list_notifications(&self, user_id: Uuid) -> StoreResult<Vec<Notification>> {
        Ok(Notification::list_by_user(&self.pool, user_id).await?)
    }

    async fn mark_notification_read(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<Notification>> {
        Ok(Notification::mark_read(&self.pool, id, user_id).await?)
    }
}
