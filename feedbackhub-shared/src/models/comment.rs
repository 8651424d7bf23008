/// Comment model and database operations
///
/// Comments form a flat thread under a feedback record. Only the two
/// parties of the feedback may write them; deleting the feedback removes
/// its comments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::user::{Role, UserIdentity};

/// Maximum comment length in characters
pub const MAX_COMMENT_LENGTH: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub feedback_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Comment as shown to clients, with its author resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentDetails {
    pub id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub user: UserIdentity,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub feedback_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
}

// Flat join row; sqlx has no nested FromRow for the author.
#[derive(sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    feedback_id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
    author_id: Uuid,
    author_email: String,
    author_full_name: String,
    author_role: Role,
    author_team_id: Option<Uuid>,
}

impl CommentRow {
    fn into_details(self) -> (Uuid, CommentDetails) {
        (
            self.feedback_id,
            CommentDetails {
                id: self.id,
                content: self.content,
                created_at: self.created_at,
                user: UserIdentity {
                    id: self.author_id,
                    email: self.author_email,
                    full_name: self.author_full_name,
                    role: self.author_role,
                    team_id: self.author_team_id,
                },
            },
        )
    }
}

impl Comment {
    pub async fn create(pool: &PgPool, data: NewComment) -> Result<Self, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (feedback_id, user_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, feedback_id, user_id, content, created_at
            "#,
        )
        .bind(data.feedback_id)
        .bind(data.user_id)
        .bind(data.content)
        .fetch_one(pool)
        .await?;

        Ok(comment)
    }

    /// Comments on any of the given feedback records, oldest first, paired
    /// with the feedback id they belong to
    pub async fn details_for_feedback(
        pool: &PgPool,
        feedback_ids: &[Uuid],
    ) -> Result<Vec<(Uuid, CommentDetails)>, sqlx::Error> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT c.id, c.feedback_id, c.content, c.created_at,
                   u.id AS author_id, u.email AS author_email,
                   u.full_name AS author_full_name, u.role AS author_role,
                   u.team_id AS author_team_id
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.feedback_id = ANY($1)
            ORDER BY c.created_at ASC, c.id ASC
            "#,
        )
        .bind(feedback_ids)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(CommentRow::into_details).collect())
    }
}
