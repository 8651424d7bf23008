//! Service error taxonomy
//!
//! Every service operation fails with one of these kinds; the API layer
//! maps each kind to exactly one HTTP status.

use tracing::error;

use crate::ai::AiError;
use crate::auth::authorization::AuthzError;
use crate::auth::jwt::JwtError;
use crate::auth::password::PasswordError;
use crate::report::ReportError;
use crate::store::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    /// An external dependency (AI provider, PDF renderer) failed
    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn not_found(what: &str) -> Self {
        ServiceError::NotFound(format!("{} not found", what))
    }

}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(constraint) => {
                ServiceError::Conflict(format!("Record already exists ({})", constraint))
            }
            StoreError::MissingReference(constraint) => {
                ServiceError::Validation(format!("Referenced record does not exist ({})", constraint))
            }
            StoreError::Database(_) | StoreError::Unavailable(_) => {
                error!(error = %err, "Store operation failed");
                ServiceError::Internal("Internal server error".to_string())
            }
        }
    }
}

impl From<AuthzError> for ServiceError {
    fn from(err: AuthzError) -> Self {
        ServiceError::Forbidden(err.to_string())
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        error!(error = %err, "Password hashing failed");
        ServiceError::Internal("Internal server error".to_string())
    }
}

impl From<JwtError> for ServiceError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::CreateError(_) => {
                error!(error = %err, "Token creation failed");
                ServiceError::Internal("Internal server error".to_string())
            }
            other => ServiceError::Unauthorized(other.to_string()),
        }
    }
}

impl From<AiError> for ServiceError {
    fn from(err: AiError) -> Self {
        ServiceError::Upstream(err.to_string())
    }
}

impl From<ReportError> for ServiceError {
    fn from(err: ReportError) -> Self {
        ServiceError::Upstream(err.to_string())
    }
}
