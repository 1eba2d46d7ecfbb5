use std::sync::Arc;

use crate::contract::model::{User, UserData};
use crate::domain::error::DomainError;
use crate::domain::repo::{RepoError, UsersStore};
use chrono::{DateTime, SubsecRound, Utc};
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Domain service with business rules for user management.
/// Depends only on the store port, not on infra types.
///
/// Every operation runs inside one unit of work obtained from the store. It is
/// committed on success only; any early return drops it, which rolls back.
#[derive(Clone)]
pub struct Service {
    store: Arc<dyn UsersStore>,
}

impl Service {
    /// Create a service with its store dependency.
    pub fn new(store: Arc<dyn UsersStore>) -> Self {
        Self { store }
    }

    #[instrument(name = "users_info.service.get_user", skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: Uuid) -> Result<User, DomainError> {
        debug!("Getting user by id");

        let uow = self.store.begin().await?;
        let user = uow
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::user_not_found(id))?;
        uow.commit().await?;

        debug!("Successfully retrieved user");
        Ok(user)
    }

    #[instrument(name = "users_info.service.list_users", skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        debug!("Listing users");

        let uow = self.store.begin().await?;
        let users = uow.find_all().await?;
        uow.commit().await?;

        debug!("Successfully listed {} users", users.len());
        Ok(users)
    }

    #[instrument(
        name = "users_info.service.create_user",
        skip(self, data),
        fields(email = %data.email)
    )]
    pub async fn create_user(&self, data: UserData) -> Result<User, DomainError> {
        info!("Creating new user");

        let uow = self.store.begin().await?;

        // Uniqueness is checked strictly before any write
        if uow.email_exists(&data.email).await? {
            return Err(DomainError::email_already_exists(data.email));
        }

        let now = now_micros();
        let user = User {
            id: Uuid::now_v7(),
            name: data.name,
            email: data.email,
            birth_date: data.birth_date,
            created_at: now,
            updated_at: now,
        };

        uow.insert(user.clone())
            .await
            .map_err(|e| unique_as_duplicate(e, &user.email))?;
        uow.commit().await?;

        info!("Successfully created user with id={}", user.id);
        Ok(user)
    }

    #[instrument(
        name = "users_info.service.update_user",
        skip(self, data),
        fields(user_id = %id)
    )]
    pub async fn update_user(&self, id: Uuid, data: UserData) -> Result<User, DomainError> {
        info!("Updating user");

        let uow = self.store.begin().await?;

        // Load current
        let mut current = uow
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::user_not_found(id))?;

        // Re-submitting the caller's own email is not a conflict
        if data.email != current.email && uow.email_exists(&data.email).await? {
            return Err(DomainError::email_already_exists(data.email));
        }

        current.name = data.name;
        current.email = data.email;
        current.birth_date = data.birth_date;
        current.updated_at = now_micros();

        uow.update(current.clone())
            .await
            .map_err(|e| unique_as_duplicate(e, &current.email))?;
        uow.commit().await?;

        info!("Successfully updated user");
        Ok(current)
    }

    #[instrument(
        name = "users_info.service.delete_user",
        skip(self),
        fields(user_id = %id)
    )]
    pub async fn delete_user(&self, id: Uuid) -> Result<(), DomainError> {
        info!("Deleting user");

        let uow = self.store.begin().await?;

        if !uow.exists(id).await? {
            return Err(DomainError::user_not_found(id));
        }

        let deleted = uow.delete(id).await.map_err(|e| match e {
            RepoError::ForeignKeyViolation(_) => DomainError::integrity_violation(id),
            other => other.into(),
        })?;
        if !deleted {
            return Err(DomainError::user_not_found(id));
        }
        uow.commit().await?;

        info!("Successfully deleted user");
        Ok(())
    }
}

/// Current time at the precision every supported store keeps (PostgreSQL
/// `timestamptz` stores microseconds), so responses match later reads.
fn now_micros() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// A unique violation on write means a concurrent writer took the email
/// between our pre-check and the insert/update.
fn unique_as_duplicate(e: RepoError, email: &str) -> DomainError {
    match e {
        RepoError::UniqueViolation(_) => DomainError::email_already_exists(email),
        other => other.into(),
    }
}
