/// Bearer token resolution
///
/// Turns an `Authorization` header into the current [`UserIdentity`]. The
/// token only proves who the caller is; role and team always come from the
/// store, so a deleted user's token stops working at once.
///
/// # Example
///
/// ```no_run
/// use feedbackhub_shared::auth::identity::{authenticate, bearer_token};
/// use feedbackhub_shared::store::Store;
///
/// # async fn example(store: &dyn Store, header: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
/// let token = bearer_token(header)?;
/// let user = authenticate(store, token, "jwt-secret").await?;
/// println!("{} is a {}", user.email, user.role);
/// # Ok(())
/// # }
/// ```

use tracing::debug;

use super::jwt::{validate_token, JwtError};
use crate::models::user::UserIdentity;
use crate::store::{Store, StoreError};

/// Error type for request authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing credentials")]
    MissingCredentials,

    #[error("Invalid authorization header: {0}")]
    InvalidFormat(String),

    #[error("Could not validate credentials: {0}")]
    InvalidToken(String),

    /// Token is valid but its subject no longer exists
    #[error("Could not validate credentials: user not found")]
    UnknownUser,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        AuthError::InvalidToken(err.to_string())
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value
///
/// The scheme is matched case-insensitively.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingCredentials)?;

    let (scheme, token) = header.split_once(' ').ok_or_else(|| {
        AuthError::InvalidFormat("Expected 'Bearer <token>'".to_string())
    })?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidFormat(
            "Expected 'Bearer <token>'".to_string(),
        ));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingCredentials);
    }

    Ok(token)
}

/// Validates a token and loads the user it was issued to
///
/// # Errors
///
/// - `AuthError::InvalidToken` for bad signatures, expired tokens and
///   subjects that are not user ids
/// - `AuthError::UnknownUser` if the user was deleted
/// - `AuthError::Store` if the lookup itself fails
pub async fn authenticate(
    store: &dyn Store,
    token: &str,
    secret: &str,
) -> Result<UserIdentity, AuthError> {
    let claims = validate_token(token, secret)?;
    let user_id = claims.user_id()?;

    let user = store.find_user(user_id).await?.ok_or_else(|| {
        debug!(%user_id, "Token subject no longer exists");
        AuthError::UnknownUser
    })?;

    Ok(user.identity())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{create_token, Claims};
    use crate::models::user::{NewUser, Role};
    use crate::store::memory::MemoryStore;
    use chrono::Duration;
    use uuid::Uuid;

    const SECRET: &str = "identity-test-secret-at-least-32-bytes";

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc.def")).unwrap(), "abc.def");
        assert_eq!(bearer_token(Some("bearer abc.def")).unwrap(), "abc.def");
        assert!(matches!(
            bearer_token(None),
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            bearer_token(Some("Basic dXNlcjpwYXNz")),
            Err(AuthError::InvalidFormat(_))
        ));
        assert!(matches!(
            bearer_token(Some("Bearer")),
            Err(AuthError::InvalidFormat(_))
        ));
        assert!(matches!(
            bearer_token(Some("Bearer   ")),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[tokio::test]
    async fn test_authenticate_resolves_current_user() {
        let store = MemoryStore::new();
        let user = store
            .create_user(NewUser {
                email: "emp@example.com".to_string(),
                full_name: "Emp".to_string(),
                password_hash: "hash".to_string(),
                role: Role::Employee,
                team_id: None,
            })
            .await
            .unwrap();

        let token = create_token(&Claims::new(user.id), SECRET).unwrap();
        let identity = authenticate(&store, &token, SECRET).await.unwrap();

        assert_eq!(identity, user.identity());
    }

    #[tokio::test]
    async fn test_authenticate_rejects_unknown_subject() {
        let store = MemoryStore::new();
        let token = create_token(&Claims::new(Uuid::new_v4()), SECRET).unwrap();

        assert!(matches!(
            authenticate(&store, &token, SECRET).await,
            Err(AuthError::UnknownUser)
        ));
    }

    #[tokio::test]
    async fn test_authenticate_rejects_expired_and_malformed() {
        let store = MemoryStore::new();

        let expired = Claims::with_expiration(Uuid::new_v4(), Duration::seconds(-120));
        let token = create_token(&expired, SECRET).unwrap();
        assert!(matches!(
            authenticate(&store, &token, SECRET).await,
            Err(AuthError::InvalidToken(_))
        ));

        let mut bad_subject = Claims::new(Uuid::new_v4());
        bad_subject.sub = "not-a-uuid".to_string();
        let token = create_token(&bad_subject, SECRET).unwrap();
        assert!(matches!(
            authenticate(&store, &token, SECRET).await,
            Err(AuthError::InvalidToken(_))
        ));
    }
}
