//! Team registry: creation, membership, directory and statistics

use tracing::{info, warn};
use uuid::Uuid;

use super::error::{ServiceError, ServiceResult};
use crate::auth::authorization::require_manager;
use crate::models::feedback::SentimentCount;
use crate::models::team::{AssignOutcome, Team, TeamDetails, TeamSummary};
use crate::models::user::UserIdentity;
use crate::store::{Store, StoreError};

/// Creates a team managed by the caller
///
/// # Errors
///
/// - `Forbidden`: caller is not a manager
/// - `Validation`: blank name
/// - `Conflict`: caller already manages a team
pub async fn create_team(store: &dyn Store, actor: &UserIdentity, name: &str) -> ServiceResult<Team> {
    require_manager(actor)?;

    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::Validation("Team name must not be empty".to_string()));
    }

    let team = store.create_team(name, actor.id).await.map_err(|e| match e {
        StoreError::Conflict(_) => ServiceError::Conflict("Manager already has a team".to_string()),
        other => other.into(),
    })?;

    if store.set_user_team(actor.id, team.id).await?.is_none() {
        warn!(manager_id = %actor.id, "Manager vanished while creating team");
    }

    info!(team_id = %team.id, manager_id = %actor.id, "Team created");
    Ok(team)
}

/// Team managed by the caller, with manager and members resolved
pub async fn my_team(store: &dyn Store, actor: &UserIdentity) -> ServiceResult<TeamDetails> {
    require_manager(actor)?;

    let team = store
        .find_team_by_manager(actor.id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Team"))?;

    let members = store
        .list_team_members(team.id)
        .await?
        .iter()
        .map(|u| u.identity())
        .collect();

    Ok(TeamDetails {
        id: team.id,
        name: team.name,
        manager: actor.clone(),
        members,
    })
}

/// Places a team-less employee into `team_id`
///
/// The checks and the write happen atomically in the store; of two managers
/// racing for the same employee exactly one succeeds and the other gets
/// `Conflict`.
///
/// # Errors
///
/// - `Forbidden`: caller is not a manager, or does not manage `team_id`
/// - `NotFound`: no such user
/// - `Validation`: target is not an employee
/// - `Conflict`: target already belongs to a team
pub async fn add_member(
    store: &dyn Store,
    actor: &UserIdentity,
    team_id: Uuid,
    user_id: Uuid,
) -> ServiceResult<UserIdentity> {
    require_manager(actor)?;

    match store.assign_employee(team_id, actor.id, user_id).await? {
        AssignOutcome::Assigned(user) => {
            info!(%team_id, %user_id, manager_id = %actor.id, "Employee added to team");
            Ok(user)
        }
        AssignOutcome::NotTeamManager => Err(ServiceError::Forbidden(
            "Not authorized to add members to this team".to_string(),
        )),
        AssignOutcome::UserNotFound => Err(ServiceError::not_found("User")),
        AssignOutcome::NotAnEmployee => Err(ServiceError::Validation(
            "Only employees can be added to a team".to_string(),
        )),
        AssignOutcome::AlreadyAssigned => Err(ServiceError::Conflict(
            "User already belongs to a team".to_string(),
        )),
    }
}

/// Same as [`add_member`], targeting the team the caller manages
pub async fn add_member_to_own_team(
    store: &dyn Store,
    actor: &UserIdentity,
    user_id: Uuid,
) -> ServiceResult<UserIdentity> {
    require_manager(actor)?;

    let team = store
        .find_team_by_manager(actor.id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Team"))?;

    add_member(store, actor, team.id, user_id).await
}

/// Public team directory, ordered by name
pub async fn list_teams(store: &dyn Store) -> ServiceResult<Vec<TeamSummary>> {
    Ok(store.list_teams().await?)
}

/// Employees without a team, candidates for [`add_member`]
pub async fn unassigned_employees(store: &dyn Store) -> ServiceResult<Vec<UserIdentity>> {
    Ok(store
        .list_unassigned_employees()
        .await?
        .iter()
        .map(|u| u.identity())
        .collect())
}

/// Sentiment histogram over feedback received by the caller's team
///
/// Ordered positive, neutral, negative; buckets with no feedback are
/// omitted. A manager without a team, or a team without members or
/// feedback, yields an empty list rather than an error.
pub async fn team_stats(store: &dyn Store, actor: &UserIdentity) -> ServiceResult<Vec<SentimentCount>> {
    require_manager(actor)?;
    Ok(store.team_sentiment_counts(actor.id).await?)
}
