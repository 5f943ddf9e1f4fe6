use niyama_core::error::AppError;
use thiserror::Error;

/// Domain failures of the token issuer. Callers branch on variants, never
/// on message text; messages are the wire-visible strings.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Email already registered")]
    EmailAlreadyRegistered,

    /// Deliberately identical for unknown email and wrong password so the
    /// login endpoint cannot be used for account enumeration.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is deactivated")]
    AccountDeactivated,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid or expired reset token")]
    InvalidOrExpiredToken,

    #[error("User not found")]
    UserNotFound,

    #[error("Store error: {0}")]
    Store(#[source] anyhow::Error),

    #[error("Cache error: {0}")]
    Cache(#[source] anyhow::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmailAlreadyRegistered => {
                AppError::Conflict(anyhow::anyhow!("Email already registered"))
            }
            AuthError::InvalidCredentials => {
                AppError::AuthError(anyhow::anyhow!("Invalid email or password"))
            }
            AuthError::AccountDeactivated => {
                AppError::AuthError(anyhow::anyhow!("Account is deactivated"))
            }
            AuthError::InvalidToken => AppError::AuthError(anyhow::anyhow!("Invalid token")),
            AuthError::InvalidOrExpiredToken => {
                AppError::AuthError(anyhow::anyhow!("Invalid or expired reset token"))
            }
            AuthError::UserNotFound => AppError::NotFound(anyhow::anyhow!("User not found")),
            AuthError::Store(e) => AppError::DatabaseError(e),
            AuthError::Cache(e) => AppError::CacheError(e),
            AuthError::Internal(e) => AppError::InternalError(e),
        }
    }
}
