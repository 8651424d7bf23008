/// Team model and database operations
///
/// A team is owned by exactly one manager (`UNIQUE(manager_id)`) and groups
/// any number of employees through `users.team_id`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE teams (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     manager_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT teams_manager_id_key UNIQUE (manager_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::feedback::SentimentCount;
use super::user::{Role, User, UserIdentity};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub manager_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Entry of the public team directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TeamSummary {
    pub id: Uuid,
    pub name: String,
}

/// A team with its manager and members resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamDetails {
    pub id: Uuid,
    pub name: String,
    pub manager: UserIdentity,
    pub members: Vec<UserIdentity>,
}

/// Result of placing an employee into a team
///
/// Every variant other than `Assigned` means nothing was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignOutcome {
    Assigned(UserIdentity),
    /// Team is missing or is not managed by the acting manager
    NotTeamManager,
    UserNotFound,
    NotAnEmployee,
    AlreadyAssigned,
}

impl AssignOutcome {
    /// Explains why a guarded assignment wrote nothing, given the state
    /// observed afterwards
    pub fn diagnose(team: Option<&Team>, manager_id: Uuid, user: Option<&User>) -> Self {
        match (team, user) {
            (Some(team), _) if team.manager_id != manager_id => AssignOutcome::NotTeamManager,
            (None, _) => AssignOutcome::NotTeamManager,
            (_, None) => AssignOutcome::UserNotFound,
            (_, Some(user)) if user.role != Role::Employee => AssignOutcome::NotAnEmployee,
            (_, Some(_)) => AssignOutcome::AlreadyAssigned,
        }
    }
}

impl Team {
    /// Creates a team owned by `manager_id`
    ///
    /// Returns `None` when the manager already owns a team; the unique
    /// constraint makes this safe under concurrent requests.
    pub async fn create(
        pool: &PgPool,
        name: &str,
        manager_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let team = sqlx::query_as::<_, Team>(
            r#"
            INSERT INTO teams (name, manager_id)
            VALUES ($1, $2)
            ON CONFLICT ON CONSTRAINT teams_manager_id_key DO NOTHING
            RETURNING id, name, manager_id, created_at
            "#,
        )
        .bind(name)
        .bind(manager_id)
        .fetch_optional(pool)
        .await?;

        Ok(team)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let team = sqlx::query_as::<_, Team>(
            "SELECT id, name, manager_id, created_at FROM teams WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(team)
    }

    pub async fn find_by_manager(
        pool: &PgPool,
        manager_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let team = sqlx::query_as::<_, Team>(
            "SELECT id, name, manager_id, created_at FROM teams WHERE manager_id = $1",
        )
        .bind(manager_id)
        .fetch_optional(pool)
        .await?;

        Ok(team)
    }

    /// Public directory of teams, ordered by name
    pub async fn list(pool: &PgPool) -> Result<Vec<TeamSummary>, sqlx::Error> {
        let teams = sqlx::query_as::<_, TeamSummary>(
            "SELECT id, name FROM teams ORDER BY name, created_at",
        )
        .fetch_all(pool)
        .await?;

        Ok(teams)
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Places an employee into a team managed by `manager_id`
    ///
    /// The write is a single conditional UPDATE: it only succeeds when the
    /// team belongs to the manager, the target is an employee, and the
    /// employee has no team yet. Two managers racing for the same employee
    /// therefore cannot both win. When nothing is written, the current state
    /// is re-read to report why.
    pub async fn assign_employee(
        pool: &PgPool,
        team_id: Uuid,
        manager_id: Uuid,
        user_id: Uuid,
    ) -> Result<AssignOutcome, sqlx::Error> {
        let assigned = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET team_id = $1
            WHERE id = $2
              AND role = 'employee'
              AND team_id IS NULL
              AND EXISTS (SELECT 1 FROM teams WHERE id = $1 AND manager_id = $3)
            RETURNING id, email, full_name, password_hash, role, team_id, created_at
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .bind(manager_id)
        .fetch_optional(pool)
        .await?;

        if let Some(user) = assigned {
            return Ok(AssignOutcome::Assigned(user.identity()));
        }

        let team = Team::find_by_id(pool, team_id).await?;
        let user = User::find_by_id(pool, user_id).await?;
        Ok(AssignOutcome::diagnose(team.as_ref(), manager_id, user.as_ref()))
    }

    /// Sentiment histogram over all feedback received by members of the
    /// team managed by `manager_id`
    ///
    /// Feedback without a sentiment is not counted. Rows come back in enum
    /// declaration order (positive, neutral, negative) and zero counts are
    /// omitted.
    pub async fn sentiment_counts(
        pool: &PgPool,
        manager_id: Uuid,
    ) -> Result<Vec<SentimentCount>, sqlx::Error> {
        let counts = sqlx::query_as::<_, SentimentCount>(
            r#"
            SELECT f.sentiment, COUNT(*) AS count
            FROM feedback f
            JOIN users u ON u.id = f.employee_id
            JOIN teams t ON t.id = u.team_id
            WHERE t.manager_id = $1 AND f.sentiment IS NOT NULL
            GROUP BY f.sentiment
            ORDER BY f.sentiment
            "#,
        )
        .bind(manager_id)
        .fetch_all(pool)
        .await?;

        Ok(counts)
    }
}
