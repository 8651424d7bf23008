/// Role gates and ownership checks
///
/// Authorization in FeedbackHub has two layers:
///
/// 1. **Role gates**: some operations are manager-only, some employee-only
/// 2. **Resource checks**: feedback is visible to its two parties only, and
///    only its author may change or delete it
///
/// Both layers fail with [`AuthzError`], which the API maps to 403.
///
/// # Example
///
/// ```
/// use feedbackhub_shared::auth::authorization::{require_manager, require_role};
/// use feedbackhub_shared::models::user::{Role, UserIdentity};
/// use uuid::Uuid;
///
/// let employee = UserIdentity {
///     id: Uuid::new_v4(),
///     email: "e@example.com".to_string(),
///     full_name: "E".to_string(),
///     role: Role::Employee,
///     team_id: None,
/// };
///
/// assert!(require_role(&employee, Role::Employee).is_ok());
/// assert!(require_manager(&employee).is_err());
/// ```

use crate::models::feedback::Feedback;
use crate::models::user::{Role, UserIdentity};

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    #[error("Insufficient permissions: requires {required} role, has {actual}")]
    WrongRole { required: Role, actual: Role },

    #[error("Not authorized to view this feedback")]
    NotParty,

    #[error("Not authorized to modify this feedback")]
    NotAuthor,

    #[error("Not authorized to acknowledge this feedback")]
    NotRecipient,
}

pub fn require_role(user: &UserIdentity, required: Role) -> Result<(), AuthzError> {
    if user.role != required {
        return Err(AuthzError::WrongRole {
            required,
            actual: user.role,
        });
    }

    Ok(())
}

pub fn require_manager(user: &UserIdentity) -> Result<(), AuthzError> {
    require_role(user, Role::Manager)
}

pub fn require_employee(user: &UserIdentity) -> Result<(), AuthzError> {
    require_role(user, Role::Employee)
}

/// Caller must be the manager or the employee of the feedback
pub fn require_party(user: &UserIdentity, feedback: &Feedback) -> Result<(), AuthzError> {
    if !feedback.is_party(user.id) {
        return Err(AuthzError::NotParty);
    }

    Ok(())
}

/// Caller must be the manager who wrote the feedback
pub fn require_author(user: &UserIdentity, feedback: &Feedback) -> Result<(), AuthzError> {
    if feedback.manager_id != user.id {
        return Err(AuthzError::NotAuthor);
    }

    Ok(())
}

/// Caller must be the employee the feedback is about
pub fn require_recipient(user: &UserIdentity, feedback: &Feedback) -> Result<(), AuthzError> {
    if feedback.employee_id != user.id {
        return Err(AuthzError::NotRecipient);
    }

    Ok(())
}
