/// In-memory [`Store`]
///
/// Keeps every table in one `RwLock`, and every trait method takes the lock
/// exactly once, so each operation is atomic with respect to the others.
/// That gives the same guarantees the PostgreSQL backend gets from
/// conditional statements and unique constraints.
///
/// Failure injection: set `fail_team_creation` or `fail_team_linking` to
/// make the corresponding operation return `StoreError::Unavailable`.
///
/// # Example
///
/// ```
/// use feedbackhub_shared::store::{memory::MemoryStore, Store};
/// use std::sync::atomic::Ordering;
///
/// # async fn example() {
/// let store = MemoryStore::new();
/// store.fail_team_creation.store(true, Ordering::SeqCst);
/// assert!(store.create_team("Alpha", uuid::Uuid::new_v4()).await.is_err());
/// # }
/// ```

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::models::comment::{Comment, CommentDetails, NewComment};
use crate::models::feedback::{
    Feedback, FeedbackChanges, FeedbackDetails, FeedbackScope, NewFeedback, Sentiment,
    SentimentCount,
};
use crate::models::notification::Notification;
use crate::models::tag::Tag;
use crate::models::team::{AssignOutcome, Team, TeamSummary};
use crate::models::user::{NewUser, Role, User, UserIdentity};

#[derive(Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    teams: HashMap<Uuid, Team>,
    // Vec-backed tables keep insertion order, which breaks timestamp ties.
    feedback: Vec<Feedback>,
    feedback_tags: HashMap<Uuid, BTreeSet<Uuid>>,
    comments: Vec<Comment>,
    tags: HashMap<Uuid, Tag>,
    notifications: Vec<Notification>,
}

impl MemoryState {
    fn identities(&self) -> HashMap<Uuid, UserIdentity> {
        self.users
            .values()
            .map(|u| (u.id, u.identity()))
            .collect()
    }

    fn tags_of(&self, feedback_id: Uuid) -> Vec<Tag> {
        let mut tags: Vec<Tag> = self
            .feedback_tags
            .get(&feedback_id)
            .into_iter()
            .flatten()
            .filter_map(|tag_id| self.tags.get(tag_id).cloned())
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        tags
    }

    fn comments_of(&self, feedback_id: Uuid) -> Vec<CommentDetails> {
        let mut comments: Vec<CommentDetails> = self
            .comments
            .iter()
            .filter(|c| c.feedback_id == feedback_id)
            .filter_map(|c| {
                let author = self.users.get(&c.user_id)?;
                Some(CommentDetails {
                    id: c.id,
                    content: c.content.clone(),
                    created_at: c.created_at,
                    user: author.identity(),
                })
            })
            .collect();
        comments.sort_by_key(|c| c.created_at);
        comments
    }

    fn details(&self, rows: Vec<Feedback>) -> Vec<FeedbackDetails> {
        let users = self.identities();
        let tags = rows.iter().map(|f| (f.id, self.tags_of(f.id))).collect();
        let comments = rows.iter().map(|f| (f.id, self.comments_of(f.id))).collect();
        FeedbackDetails::assemble(rows, &users, tags, comments)
    }

    fn link_tags(&mut self, feedback_id: Uuid, tag_ids: &[Uuid]) -> StoreResult<()> {
        if let Some(missing) = tag_ids.iter().find(|id| !self.tags.contains_key(*id)) {
            return Err(StoreError::MissingReference(format!(
                "feedback_tags_tag_id_fkey ({})",
                missing
            )));
        }
        self.feedback_tags
            .insert(feedback_id, tag_ids.iter().copied().collect());
        Ok(())
    }

    fn remove_feedback(&mut self, id: Uuid) {
        self.feedback.retain(|f| f.id != id);
        self.feedback_tags.remove(&id);
        self.comments.retain(|c| c.feedback_id != id);
    }
}

/// Newest first; among equal timestamps the later insertion wins
fn newest_first<T, F>(items: &[T], keep: F) -> Vec<T>
where
    T: Clone + HasCreatedAt,
    F: Fn(&T) -> bool,
{
    let mut out: Vec<T> = items.iter().rev().filter(|i| keep(*i)).cloned().collect();
    out.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
    out
}

trait HasCreatedAt {
    fn created_at(&self) -> chrono::DateTime<Utc>;
}

impl HasCreatedAt for Feedback {
    fn created_at(&self) -> chrono::DateTime<Utc> {
        self.created_at
    }
}

impl HasCreatedAt for Notification {
    fn created_at(&self) -> chrono::DateTime<Utc> {
        self.created_at
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    pub fail_team_creation: AtomicBool,
    pub fail_team_linking: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn injected(flag: &AtomicBool, operation: &str) -> StoreResult<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("injected failure: {}", operation)));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn create_user(&self, data: NewUser) -> StoreResult<User> {
        let mut state = self.state.write().await;

        if state.users.values().any(|u| u.email == data.email) {
            return Err(StoreError::Conflict("users_email_key".to_string()));
        }
        if let Some(team_id) = data.team_id {
            if !state.teams.contains_key(&team_id) {
                return Err(StoreError::MissingReference("users_team_id_fkey".to_string()));
            }
        }

        let user = User {
            id: Uuid::new_v4(),
            email: data.email,
            full_name: data.full_name,
            password_hash: data.password_hash,
            role: data.role,
            team_id: data.team_id,
            created_at: Utc::now(),
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.write().await;

        if state.users.remove(&id).is_none() {
            return Ok(false);
        }

        // Same cascades as the foreign keys.
        let owned: Vec<Uuid> = state
            .teams
            .values()
            .filter(|t| t.manager_id == id)
            .map(|t| t.id)
            .collect();
        for team_id in owned {
            state.teams.remove(&team_id);
            for user in state.users.values_mut() {
                if user.team_id == Some(team_id) {
                    user.team_id = None;
                }
            }
        }
        let gone: Vec<Uuid> = state
            .feedback
            .iter()
            .filter(|f| f.is_party(id))
            .map(|f| f.id)
            .collect();
        for feedback_id in gone {
            state.remove_feedback(feedback_id);
        }
        state.comments.retain(|c| c.user_id != id);
        state.notifications.retain(|n| n.user_id != id);

        Ok(true)
    }

    async fn set_user_team(&self, user_id: Uuid, team_id: Uuid) -> StoreResult<Option<User>> {
        Self::injected(&self.fail_team_linking, "set_user_team")?;
        let mut state = self.state.write().await;

        if !state.teams.contains_key(&team_id) {
            return Err(StoreError::MissingReference("users_team_id_fkey".to_string()));
        }

        Ok(state.users.get_mut(&user_id).map(|user| {
            user.team_id = Some(team_id);
            user.clone()
        }))
    }

    async fn list_unassigned_employees(&self) -> StoreResult<Vec<User>> {
        let state = self.state.read().await;
        let mut users: Vec<User> = state
            .users
            .values()
            .filter(|u| u.role == Role::Employee && u.team_id.is_none())
            .cloned()
            .collect();
        users.sort_by(|a, b| (&a.full_name, a.created_at).cmp(&(&b.full_name, b.created_at)));
        Ok(users)
    }

    async fn list_team_members(&self, team_id: Uuid) -> StoreResult<Vec<User>> {
        let state = self.state.read().await;
        let mut users: Vec<User> = state
            .users
            .values()
            .filter(|u| u.role == Role::Employee && u.team_id == Some(team_id))
            .cloned()
            .collect();
        users.sort_by(|a, b| (&a.full_name, a.created_at).cmp(&(&b.full_name, b.created_at)));
        Ok(users)
    }

    async fn create_team(&self, name: &str, manager_id: Uuid) -> StoreResult<Team> {
        Self::injected(&self.fail_team_creation, "create_team")?;
        let mut state = self.state.write().await;

        if !state.users.contains_key(&manager_id) {
            return Err(StoreError::MissingReference("teams_manager_id_fkey".to_string()));
        }
        if state.teams.values().any(|t| t.manager_id == manager_id) {
            return Err(StoreError::Conflict("teams_manager_id_key".to_string()));
        }

        let team = Team {
            id: Uuid::new_v4(),
            name: name.to_string(),
            manager_id,
            created_at: Utc::now(),
        };
        state.teams.insert(team.id, team.clone());
        Ok(team)
    }

    async fn find_team(&self, id: Uuid) -> StoreResult<Option<Team>> {
        Ok(self.state.read().await.teams.get(&id).cloned())
    }

    async fn find_team_by_manager(&self, manager_id: Uuid) -> StoreResult<Option<Team>> {
        let state = self.state.read().await;
        Ok(state
            .teams
            .values()
            .find(|t| t.manager_id == manager_id)
            .cloned())
    }

    async fn list_teams(&self) -> StoreResult<Vec<TeamSummary>> {
        let state = self.state.read().await;
        let mut teams: Vec<&Team> = state.teams.values().collect();
        teams.sort_by(|a, b| (&a.name, a.created_at).cmp(&(&b.name, b.created_at)));
        Ok(teams
            .into_iter()
            .map(|t| TeamSummary {
                id: t.id,
                name: t.name.clone(),
            })
            .collect())
    }

    async fn delete_team(&self, id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.write().await;

        if state.teams.remove(&id).is_none() {
            return Ok(false);
        }
        for user in state.users.values_mut() {
            if user.team_id == Some(id) {
                user.team_id = None;
            }
        }
        Ok(true)
    }

    async fn assign_employee(
        &self,
        team_id: Uuid,
        manager_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<AssignOutcome> {
        let mut state = self.state.write().await;

        let outcome = AssignOutcome::diagnose(
            state.teams.get(&team_id),
            manager_id,
            state.users.get(&user_id),
        );
        // `diagnose` reports AlreadyAssigned for any eligible employee; only
        // a team-less one may actually be placed.
        let assignable = outcome == AssignOutcome::AlreadyAssigned
            && state
                .users
                .get(&user_id)
                .is_some_and(|u| u.team_id.is_none());
        if !assignable {
            return Ok(outcome);
        }

        match state.users.get_mut(&user_id) {
            Some(user) => {
                user.team_id = Some(team_id);
                Ok(AssignOutcome::Assigned(user.identity()))
            }
            None => Ok(AssignOutcome::UserNotFound),
        }
    }

    async fn team_sentiment_counts(&self, manager_id: Uuid) -> StoreResult<Vec<SentimentCount>> {
        let state = self.state.read().await;

        let Some(team) = state.teams.values().find(|t| t.manager_id == manager_id) else {
            return Ok(Vec::new());
        };

        let mut counts: HashMap<Sentiment, i64> = HashMap::new();
        for feedback in &state.feedback {
            let in_team = state
                .users
                .get(&feedback.employee_id)
                .is_some_and(|u| u.team_id == Some(team.id));
            if let (true, Some(sentiment)) = (in_team, feedback.sentiment) {
                *counts.entry(sentiment).or_default() += 1;
            }
        }

        Ok(Sentiment::ALL
            .iter()
            .filter_map(|s| {
                counts.get(s).map(|&count| SentimentCount {
                    sentiment: *s,
                    count,
                })
            })
            .collect())
    }

    async fn create_feedback(&self, data: NewFeedback) -> StoreResult<Option<Feedback>> {
        let mut state = self.state.write().await;

        let in_team = state.users.get(&data.employee_id).is_some_and(|u| {
            u.role == Role::Employee
                && u.team_id
                    .and_then(|team_id| state.teams.get(&team_id))
                    .is_some_and(|t| t.manager_id == data.manager_id)
        });
        if !in_team {
            return Ok(None);
        }

        let now = Utc::now();
        let feedback = Feedback {
            id: Uuid::new_v4(),
            employee_id: data.employee_id,
            manager_id: data.manager_id,
            strengths: data.strengths,
            areas_for_improvement: data.areas_for_improvement,
            sentiment: data.sentiment,
            acknowledged: false,
            created_at: now,
            updated_at: now,
        };
        state.link_tags(feedback.id, &data.tag_ids)?;
        state.feedback.push(feedback.clone());
        Ok(Some(feedback))
    }

    async fn find_feedback(&self, id: Uuid) -> StoreResult<Option<Feedback>> {
        let state = self.state.read().await;
        Ok(state.feedback.iter().find(|f| f.id == id).cloned())
    }

    async fn feedback_details(&self, id: Uuid) -> StoreResult<Option<FeedbackDetails>> {
        let state = self.state.read().await;
        let rows: Vec<Feedback> = state.feedback.iter().filter(|f| f.id == id).cloned().collect();
        Ok(state.details(rows).pop())
    }

    async fn list_feedback(&self, scope: FeedbackScope) -> StoreResult<Vec<FeedbackDetails>> {
        let state = self.state.read().await;
        let rows = newest_first(&state.feedback, |f| match scope {
            FeedbackScope::ReceivedBy(id) => f.employee_id == id,
            FeedbackScope::WrittenBy(id) => f.manager_id == id,
        });
        Ok(state.details(rows))
    }

    async fn update_feedback(
        &self,
        id: Uuid,
        manager_id: Uuid,
        changes: FeedbackChanges,
    ) -> StoreResult<Option<Feedback>> {
        let mut state = self.state.write().await;

        let Some(index) = state
            .feedback
            .iter()
            .position(|f| f.id == id && f.manager_id == manager_id)
        else {
            return Ok(None);
        };

        if let Some(tag_ids) = &changes.tag_ids {
            state.link_tags(id, tag_ids)?;
        }

        let feedback = &mut state.feedback[index];
        if let Some(strengths) = changes.strengths {
            feedback.strengths = Some(strengths);
        }
        if let Some(areas) = changes.areas_for_improvement {
            feedback.areas_for_improvement = Some(areas);
        }
        if let Some(sentiment) = changes.sentiment {
            feedback.sentiment = Some(sentiment);
        }
        feedback.updated_at = Utc::now();

        Ok(Some(feedback.clone()))
    }

    async fn acknowledge_feedback(
        &self,
        id: Uuid,
        employee_id: Uuid,
    ) -> StoreResult<Option<Feedback>> {
        let mut state = self.state.write().await;

        Ok(state
            .feedback
            .iter_mut()
            .find(|f| f.id == id && f.employee_id == employee_id)
            .map(|f| {
                f.acknowledged = true;
                f.updated_at = Utc::now();
                f.clone()
            }))
    }

    async fn delete_feedback(&self, id: Uuid, manager_id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.write().await;

        let owned = state
            .feedback
            .iter()
            .any(|f| f.id == id && f.manager_id == manager_id);
        if owned {
            state.remove_feedback(id);
        }
        Ok(owned)
    }

    async fn add_comment(&self, data: NewComment) -> StoreResult<Comment> {
        let mut state = self.state.write().await;

        if !state.feedback.iter().any(|f| f.id == data.feedback_id) {
            return Err(StoreError::MissingReference(
                "comments_feedback_id_fkey".to_string(),
            ));
        }
        if !state.users.contains_key(&data.user_id) {
            return Err(StoreError::MissingReference("comments_user_id_fkey".to_string()));
        }

        let comment = Comment {
            id: Uuid::new_v4(),
            feedback_id: data.feedback_id,
            user_id: data.user_id,
            content: data.content,
            created_at: Utc::now(),
        };
        state.comments.push(comment.clone());
        Ok(comment)
    }

    async fn list_comments(&self, feedback_id: Uuid) -> StoreResult<Vec<CommentDetails>> {
        Ok(self.state.read().await.comments_of(feedback_id))
    }

    async fn get_or_create_tags(&self, names: &[String]) -> StoreResult<Vec<Tag>> {
        let mut state = self.state.write().await;

        let mut result: Vec<Tag> = Vec::new();
        for name in names {
            if result.iter().any(|t| &t.name == name) {
                continue;
            }
            let existing = state.tags.values().find(|t| &t.name == name).cloned();
            let tag = match existing {
                Some(tag) => tag,
                None => {
                    let tag = Tag {
                        id: Uuid::new_v4(),
                        name: name.clone(),
                    };
                    state.tags.insert(tag.id, tag.clone());
                    tag
                }
            };
            result.push(tag);
        }
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    async fn find_tags(&self, ids: &[Uuid]) -> StoreResult<Vec<Tag>> {
        let state = self.state.read().await;
        let unique: BTreeSet<&Uuid> = ids.iter().collect();
        let mut tags: Vec<Tag> = unique
            .into_iter()
            .filter_map(|id| state.tags.get(id).cloned())
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn list_tags(&self) -> StoreResult<Vec<Tag>> {
        let state = self.state.read().await;
        let mut tags: Vec<Tag> = state.tags.values().cloned().collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn create_notification(&self, user_id: Uuid, message: &str) -> StoreResult<Notification> {
        let mut state = self.state.write().await;

        if !state.users.contains_key(&user_id) {
            return Err(StoreError::MissingReference(
                "notifications_user_id_fkey".to_string(),
            ));
        }

        let notification = Notification {
            id: Uuid::new_v4(),
            user_id,
            message: message.to_string(),
            is_read: false,
            created_at: Utc::now(),
        };
        state.notifications.push(notification.clone());
        Ok(notification)
    }

    async fn list_notifications(&self, user_id: Uuid) -> StoreResult<Vec<Notification>> {
        let state = self.state.read().await;
        Ok(newest_first(&state.notifications, |n| n.user_id == user_id))
    }

    async fn mark_notification_read(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<Notification>> {
        let mut state = self.state.write().await;

        Ok(state
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
            .map(|n| {
                n.is_read = true;
                n.clone()
            }))
    }
}
