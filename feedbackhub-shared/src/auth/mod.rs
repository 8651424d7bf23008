/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and the password policy
/// - [`jwt`]: HS256 access token generation and validation
/// - [`identity`]: Bearer token to current-user resolution
/// - [`authorization`]: Role gates and feedback ownership checks
///
/// # Example
///
/// ```
/// use feedbackhub_shared::auth::password::{hash_password, verify_password};
/// use feedbackhub_shared::auth::jwt::{create_token, validate_token, Claims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let token = create_token(&Claims::new(Uuid::new_v4()), "secret-key-at-least-32-bytes-long")?;
/// assert!(validate_token(&token, "secret-key-at-least-32-bytes-long").is_ok());
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod identity;
pub mod jwt;
pub mod password;
