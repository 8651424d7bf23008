//! Account registration and login
//!
//! Registering a manager creates three records: the user, their team, and
//! the link from user to team. If any step after the user insert fails, the
//! partial records are removed again (best effort) before the error is
//! returned, so a failed registration leaves no orphaned account behind.

use chrono::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use super::error::{ServiceError, ServiceResult};
use crate::auth::jwt::{create_token, Claims};
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::models::user::{NewUser, Role, User, UserIdentity};
use crate::store::Store;

/// Registration request
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub role: Role,
    /// Required for managers: name of the team they will manage
    pub team_name: Option<String>,
    /// Optional for employees: existing team to join
    pub team_id: Option<Uuid>,
}

/// Creates an account
///
/// # Errors
///
/// - `Validation`: weak password, or a manager without a team name
/// - `Conflict`: email already registered
/// - `NotFound`: employee asked to join a team that does not exist
/// - `Internal`: storage failed mid-way (partial records are cleaned up)
pub async fn register(store: &dyn Store, req: Registration) -> ServiceResult<UserIdentity> {
    let email = req.email.trim().to_lowercase();
    let full_name = req.full_name.trim().to_string();

    if full_name.is_empty() {
        return Err(ServiceError::Validation("Full name is required".to_string()));
    }
    validate_password_strength(&req.password).map_err(ServiceError::Validation)?;

    let team_name = match req.role {
        Role::Manager => {
            let name = req
                .team_name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .ok_or_else(|| {
                    ServiceError::Validation("Team name is required for managers".to_string())
                })?;
            Some(name.to_string())
        }
        Role::Employee => None,
    };

    if store.find_user_by_email(&email).await?.is_some() {
        return Err(ServiceError::Conflict(
            "A user with this email already exists".to_string(),
        ));
    }

    let team_id = match (req.role, req.team_id) {
        (Role::Employee, Some(team_id)) => {
            store
                .find_team(team_id)
                .await?
                .ok_or_else(|| ServiceError::not_found("Team"))?;
            Some(team_id)
        }
        _ => None,
    };

    let password_hash = hash_password(&req.password)?;

    let user = store
        .create_user(NewUser {
            email,
            full_name,
            password_hash,
            role: req.role,
            team_id,
        })
        .await
        .map_err(|e| match ServiceError::from(e) {
            ServiceError::Conflict(_) => {
                ServiceError::Conflict("A user with this email already exists".to_string())
            }
            other => other,
        })?;

    let Some(team_name) = team_name else {
        info!(user_id = %user.id, role = %user.role, "User registered");
        return Ok(user.identity());
    };

    match attach_new_team(store, &user, &team_name).await {
        Ok(user) => {
            info!(user_id = %user.id, team_id = ?user.team_id, "Manager registered with team");
            Ok(user.identity())
        }
        Err(err) => {
            discard_partial_manager(store, user.id).await;
            Err(err)
        }
    }
}

async fn attach_new_team(store: &dyn Store, manager: &User, team_name: &str) -> ServiceResult<User> {
    let team = store.create_team(team_name, manager.id).await?;

    match store.set_user_team(manager.id, team.id).await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(ServiceError::Internal(
            "Manager disappeared during registration".to_string(),
        )),
        Err(err) => Err(err.into()),
    }
}

/// Removes a half-registered manager together with any team they own
async fn discard_partial_manager(store: &dyn Store, user_id: Uuid) {
    match store.find_team_by_manager(user_id).await {
        Ok(Some(team)) => {
            if let Err(e) = store.delete_team(team.id).await {
                warn!(%user_id, team_id = %team.id, error = %e, "Failed to remove team of failed registration");
            }
        }
        Ok(None) => {}
        Err(e) => warn!(%user_id, error = %e, "Failed to look up team of failed registration"),
    }

    if let Err(e) = store.delete_user(user_id).await {
        warn!(%user_id, error = %e, "Failed to remove user of failed registration");
    }
}

/// Checks credentials and issues an access token
///
/// Unknown email and wrong password produce the same error.
pub async fn login(
    store: &dyn Store,
    email: &str,
    password: &str,
    secret: &str,
    token_lifetime: Duration,
) -> ServiceResult<String> {
    let invalid = || ServiceError::Unauthorized("Incorrect email or password".to_string());

    let email = email.trim().to_lowercase();
    let user = store.find_user_by_email(&email).await?.ok_or_else(invalid)?;

    if !verify_password(password, &user.password_hash)? {
        return Err(invalid());
    }

    let token = create_token(&Claims::with_expiration(user.id, token_lifetime), secret)?;
    info!(user_id = %user.id, "User logged in");

    Ok(token)
}
