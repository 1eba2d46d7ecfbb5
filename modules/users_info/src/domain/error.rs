use thiserror::Error;
use uuid::Uuid;

use crate::domain::repo::RepoError;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("User not found - id: {id}")]
    UserNotFound { id: Uuid },

    #[error("Email already registered: {email}")]
    EmailAlreadyExists { email: String },

    #[error("Referential integrity violation - id: {id}")]
    IntegrityViolation { id: Uuid },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn user_not_found(id: Uuid) -> Self {
        Self::UserNotFound { id }
    }

    pub fn email_already_exists(email: impl Into<String>) -> Self {
        Self::EmailAlreadyExists {
            email: email.into(),
        }
    }

    pub fn integrity_violation(id: Uuid) -> Self {
        Self::IntegrityViolation { id }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}

/// Store failures with no business meaning in the calling context.
///
/// Operations that can legitimately hit a constraint translate those variants
/// themselves before falling back to this conversion.
impl From<RepoError> for DomainError {
    fn from(e: RepoError) -> Self {
        // `{:#}` keeps the anyhow context chain in the message
        Self::database(format!("{e:#}"))
    }
}
