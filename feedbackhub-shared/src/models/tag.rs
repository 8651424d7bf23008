/// Tag model and database operations
///
/// Tags are a global vocabulary with unique names, attached to feedback
/// through the `feedback_tags` link table.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tags (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(100) NOT NULL,
///     CONSTRAINT tags_name_key UNIQUE (name)
/// );
///
/// CREATE TABLE feedback_tags (
///     feedback_id UUID NOT NULL REFERENCES feedback(id) ON DELETE CASCADE,
///     tag_id UUID NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
///     PRIMARY KEY (feedback_id, tag_id)
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
}

/// A tag together with the feedback it is attached to
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FeedbackTag {
    pub feedback_id: Uuid,
    pub id: Uuid,
    pub name: String,
}

impl FeedbackTag {
    pub fn into_tag(self) -> Tag {
        Tag {
            id: self.id,
            name: self.name,
        }
    }
}

impl Tag {
    /// Returns a tag for every name, creating the missing ones
    ///
    /// Two concurrent callers inserting the same new name both end up with
    /// the same row: the insert skips names that already exist and the
    /// final select re-reads every requested name.
    pub async fn get_or_create(pool: &PgPool, names: &[String]) -> Result<Vec<Self>, sqlx::Error> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query(
            r#"
            INSERT INTO tags (name)
            SELECT UNNEST($1::varchar[])
            ON CONFLICT ON CONSTRAINT tags_name_key DO NOTHING
            "#,
        )
        .bind(names)
        .execute(pool)
        .await?;

        let tags = sqlx::query_as::<_, Tag>(
            "SELECT id, name FROM tags WHERE name = ANY($1) ORDER BY name",
        )
        .bind(names)
        .fetch_all(pool)
        .await?;

        Ok(tags)
    }

    pub async fn find_many(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Self>, sqlx::Error> {
        let tags = sqlx::query_as::<_, Tag>(
            "SELECT id, name FROM tags WHERE id = ANY($1) ORDER BY name",
        )
        .bind(ids)
        .fetch_all(pool)
        .await?;

        Ok(tags)
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let tags = sqlx::query_as::<_, Tag>("SELECT id, name FROM tags ORDER BY name")
            .fetch_all(pool)
            .await?;

        Ok(tags)
    }

    /// Tags attached to any of the given feedback records
    pub async fn for_feedback(
        pool: &PgPool,
        feedback_ids: &[Uuid],
    ) -> Result<Vec<FeedbackTag>, sqlx::Error> {
        let tags = sqlx::query_as::<_, FeedbackTag>(
            r#"
            SELECT ft.feedback_id, t.id, t.name
            FROM feedback_tags ft
            JOIN tags t ON t.id = ft.tag_id
            WHERE ft.feedback_id = ANY($1)
            ORDER BY t.name
            "#,
        )
        .bind(feedback_ids)
        .fetch_all(pool)
        .await?;

        Ok(tags)
    }
}
