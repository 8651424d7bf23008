/// Feedback model and database operations
///
/// A feedback record is written by a manager about one employee of their
/// team. The employee can acknowledge it; the manager can edit or delete
/// it. Tags and comments hang off the record and are removed with it.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE feedback (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     employee_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     manager_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     strengths TEXT,
///     areas_for_improvement TEXT,
///     sentiment sentiment,
///     acknowledged BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use feedbackhub_shared::models::feedback::{Feedback, NewFeedback, Sentiment};
/// # use sqlx::PgPool;
/// # use uuid::Uuid;
///
/// # async fn example(pool: PgPool, manager_id: Uuid, employee_id: Uuid) -> Result<(), sqlx::Error> {
/// let created = Feedback::create(&pool, NewFeedback {
///     employee_id,
///     manager_id,
///     strengths: Some("Great code reviews".to_string()),
///     areas_for_improvement: None,
///     sentiment: Some(Sentiment::Positive),
///     tag_ids: vec![],
/// }).await?;
///
/// // None: the employee is not in this manager's team
/// assert!(created.is_some());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

use super::comment::CommentDetails;
use super::tag::Tag;
use super::user::UserIdentity;

/// Overall tone of a feedback record
///
/// Declaration order is the order statistics are reported in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "sentiment", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }

    /// Capitalized form used in reports
    pub fn title(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Neutral => "Neutral",
            Sentiment::Negative => "Negative",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One bucket of the team sentiment histogram
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SentimentCount {
    pub sentiment: Sentiment,
    pub count: i64,
}

/// Stored feedback row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Feedback {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub manager_id: Uuid,
    pub strengths: Option<String>,
    pub areas_for_improvement: Option<String>,
    pub sentiment: Option<Sentiment>,

    /// Set once by the employee; never reverts to false
    pub acknowledged: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Feedback {
    /// Whether `user_id` is the author or the recipient
    pub fn is_party(&self, user_id: Uuid) -> bool {
        self.manager_id == user_id || self.employee_id == user_id
    }

    /// The party on the other side of `user_id`
    pub fn counterpart(&self, user_id: Uuid) -> Uuid {
        if self.manager_id == user_id {
            self.employee_id
        } else {
            self.manager_id
        }
    }
}

/// Feedback with both parties, tags and the comment thread resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackDetails {
    pub id: Uuid,
    pub employee: UserIdentity,
    pub manager: UserIdentity,
    pub strengths: Option<String>,
    pub areas_for_improvement: Option<String>,
    pub sentiment: Option<Sentiment>,
    pub acknowledged: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub tags: Vec<Tag>,
    pub comments: Vec<CommentDetails>,
}

impl FeedbackDetails {
    /// Joins feedback rows with their related records
    ///
    /// Row order is preserved. A row whose employee or manager is missing
    /// from `users` is dropped; with foreign keys in place that only happens
    /// if a user is deleted mid-read.
    pub fn assemble(
        rows: Vec<Feedback>,
        users: &HashMap<Uuid, UserIdentity>,
        mut tags: HashMap<Uuid, Vec<Tag>>,
        mut comments: HashMap<Uuid, Vec<CommentDetails>>,
    ) -> Vec<Self> {
        rows.into_iter()
            .filter_map(|row| {
                let employee = users.get(&row.employee_id)?.clone();
                let manager = users.get(&row.manager_id)?.clone();
                Some(FeedbackDetails {
                    id: row.id,
                    employee,
                    manager,
                    strengths: row.strengths,
                    areas_for_improvement: row.areas_for_improvement,
                    sentiment: row.sentiment,
                    acknowledged: row.acknowledged,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                    tags: tags.remove(&row.id).unwrap_or_default(),
                    comments: comments.remove(&row.id).unwrap_or_default(),
                })
            })
            .collect()
    }
}

/// Input for creating feedback
#[derive(Debug, Clone)]
pub struct NewFeedback {
    pub employee_id: Uuid,
    pub manager_id: Uuid,
    pub strengths: Option<String>,
    pub areas_for_improvement: Option<String>,
    pub sentiment: Option<Sentiment>,

    /// Already validated tag ids
    pub tag_ids: Vec<Uuid>,
}

/// Partial update of a feedback record
///
/// Only `Some` fields are applied. `tag_ids` replaces the whole tag set
/// when present (an empty list clears it).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackChanges {
    pub strengths: Option<String>,
    pub areas_for_improvement: Option<String>,
    pub sentiment: Option<Sentiment>,
    pub tag_ids: Option<Vec<Uuid>>,
}

/// Which feedback a listing covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackScope {
    /// Feedback received by an employee
    ReceivedBy(Uuid),
    /// Feedback written by a manager
    WrittenBy(Uuid),
}

impl Feedback {
    /// Creates feedback if the employee belongs to the manager's team
    ///
    /// Team membership is checked inside the INSERT itself, so a concurrent
    /// reassignment cannot slip feedback to an employee outside the team.
    /// Returns `None` when the check fails. The tag links are written in the
    /// same transaction.
    pub async fn create(pool: &PgPool, data: NewFeedback) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let feedback = sqlx::query_as::<_, Feedback>(
            r#"
            INSERT INTO feedback (employee_id, manager_id, strengths, areas_for_improvement, sentiment)
            SELECT $1, $2, $3, $4, $5
            WHERE EXISTS (
                SELECT 1
                FROM users u
                JOIN teams t ON t.id = u.team_id
                WHERE u.id = $1 AND u.role = 'employee' AND t.manager_id = $2
            )
            RETURNING id, employee_id, manager_id, strengths, areas_for_improvement,
                      sentiment, acknowledged, created_at, updated_at
            "#,
        )
        .bind(data.employee_id)
        .bind(data.manager_id)
        .bind(data.strengths)
        .bind(data.areas_for_improvement)
        .bind(data.sentiment)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(feedback) = feedback else {
            tx.rollback().await?;
            return Ok(None);
        };

        if !data.tag_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO feedback_tags (feedback_id, tag_id)
                SELECT $1, UNNEST($2::uuid[])
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(feedback.id)
            .bind(&data.tag_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(Some(feedback))
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let feedback = sqlx::query_as::<_, Feedback>(
            r#"
            SELECT id, employee_id, manager_id, strengths, areas_for_improvement,
                   sentiment, acknowledged, created_at, updated_at
            FROM feedback
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(feedback)
    }

    /// Feedback in scope, newest first
    pub async fn list(pool: &PgPool, scope: FeedbackScope) -> Result<Vec<Self>, sqlx::Error> {
        let (column, user_id) = match scope {
            FeedbackScope::ReceivedBy(id) => ("employee_id", id),
            FeedbackScope::WrittenBy(id) => ("manager_id", id),
        };

        let query = format!(
            r#"
            SELECT id, employee_id, manager_id, strengths, areas_for_improvement,
                   sentiment, acknowledged, created_at, updated_at
            FROM feedback
            WHERE {} = $1
            ORDER BY created_at DESC, id DESC
            "#,
            column
        );

        let feedback = sqlx::query_as::<_, Feedback>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await?;

        Ok(feedback)
    }

    /// Applies a partial update on behalf of the authoring manager
    ///
    /// Returns `None` if the feedback does not exist or was written by
    /// someone else. `updated_at` is always refreshed.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        manager_id: Uuid,
        data: FeedbackChanges,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let mut query = String::from("UPDATE feedback SET updated_at = NOW()");
        let mut bind_count = 2;

        if data.strengths.is_some() {
            bind_count += 1;
            query.push_str(&format!(", strengths = ${}", bind_count));
        }
        if data.areas_for_improvement.is_some() {
            bind_count += 1;
            query.push_str(&format!(", areas_for_improvement = ${}", bind_count));
        }
        if data.sentiment.is_some() {
            bind_count += 1;
            query.push_str(&format!(", sentiment = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 AND manager_id = $2 RETURNING id, employee_id, manager_id, strengths, \
             areas_for_improvement, sentiment, acknowledged, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Feedback>(&query).bind(id).bind(manager_id);

        if let Some(strengths) = data.strengths {
            q = q.bind(strengths);
        }
        if let Some(areas) = data.areas_for_improvement {
            q = q.bind(areas);
        }
        if let Some(sentiment) = data.sentiment {
            q = q.bind(sentiment);
        }

        let feedback = q.fetch_optional(&mut *tx).await?;
        let Some(feedback) = feedback else {
            tx.rollback().await?;
            return Ok(None);
        };

        if let Some(tag_ids) = data.tag_ids {
            sqlx::query("DELETE FROM feedback_tags WHERE feedback_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            if !tag_ids.is_empty() {
                sqlx::query(
                    r#"
                    INSERT INTO feedback_tags (feedback_id, tag_id)
                    SELECT $1, UNNEST($2::uuid[])
                    ON CONFLICT DO NOTHING
                    "#,
                )
                .bind(id)
                .bind(&tag_ids)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        Ok(Some(feedback))
    }

    /// Marks feedback acknowledged on behalf of its recipient
    ///
    /// Idempotent: acknowledging twice leaves the flag set. Returns `None`
    /// if the feedback does not exist or belongs to another employee.
    pub async fn acknowledge(
        pool: &PgPool,
        id: Uuid,
        employee_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let feedback = sqlx::query_as::<_, Feedback>(
            r#"
            UPDATE feedback
            SET acknowledged = TRUE, updated_at = NOW()
            WHERE id = $1 AND employee_id = $2
            RETURNING id, employee_id, manager_id, strengths, areas_for_improvement,
                      sentiment, acknowledged, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(employee_id)
        .fetch_optional(pool)
        .await?;

        Ok(feedback)
    }

    /// Deletes feedback written by `manager_id`; comments and tag links
    /// cascade
    pub async fn delete(pool: &PgPool, id: Uuid, manager_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM feedback WHERE id = $1 AND manager_id = $2")
            .bind(id)
            .bind(manager_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
