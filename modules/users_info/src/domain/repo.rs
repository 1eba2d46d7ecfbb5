use crate::contract::model::User;
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Typed store failure.
///
/// Constraint violations are surfaced separately so the domain can translate
/// them; everything else is carried as `anyhow` with operation context.
#[derive(Error, Debug)]
pub enum RepoError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Port for the domain layer: persistence operations the domain needs.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Load a user by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError>;
    /// All users in natural order (created_at, then id).
    async fn find_all(&self) -> Result<Vec<User>, RepoError>;
    /// Check existence by id.
    async fn exists(&self, id: Uuid) -> Result<bool, RepoError>;
    /// Check uniqueness by email.
    async fn email_exists(&self, email: &str) -> Result<bool, RepoError>;
    /// Insert a fully-formed domain user.
    ///
    /// Service computes id/timestamps; repo persists.
    async fn insert(&self, u: User) -> Result<(), RepoError>;
    /// Update an existing user (by primary key in `u.id`). `created_at` is never written.
    async fn update(&self, u: User) -> Result<(), RepoError>;
    /// Delete by id. Returns true if a row was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, RepoError>;
}

/// One store transaction. Dropping it without `commit` rolls everything back.
#[async_trait]
pub trait UsersUnitOfWork: UsersRepository {
    async fn commit(self: Box<Self>) -> Result<(), RepoError>;
}

/// Entry point to the record store: hands out one unit of work per operation.
#[async_trait]
pub trait UsersStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn UsersUnitOfWork>, RepoError>;
}
