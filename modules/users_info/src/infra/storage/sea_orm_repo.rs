//! SeaORM-backed implementation of the store port.
//!
//! The repository is generic over `C: ConnectionTrait`, so it runs on a plain
//! `DatabaseConnection` or on a `DatabaseTransaction`. The store always hands
//! out the transactional flavour as a unit of work.
//!
//! SQLite allows a single writer, and a deferred transaction that reads
//! before it writes fails with `SQLITE_BUSY` on the lock upgrade instead of
//! waiting. On SQLite the store therefore runs units of work one at a time.

use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, SqlErr,
    TransactionTrait,
};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::contract::User;
use crate::domain::repo::{RepoError, UsersRepository, UsersStore, UsersUnitOfWork};
use crate::infra::storage::entity::{Column, Entity as UserEntity};
use crate::infra::storage::mapper::{contract_to_insert, contract_to_update};

/// SeaORM repository impl.
/// Holds a connection object; its lifetime/ownership is up to the caller.
pub struct SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
    // Held until the unit of work commits or is dropped
    gate: Option<OwnedMutexGuard<()>>,
}

impl<C> SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn, gate: None }
    }
}

/// Split constraint violations out of a driver error; everything else keeps
/// the operation name as context.
fn classify(err: DbErr, op: &'static str) -> RepoError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => RepoError::UniqueViolation(msg),
        Some(SqlErr::ForeignKeyConstraintViolation(msg)) => RepoError::ForeignKeyViolation(msg),
        _ => RepoError::Other(anyhow!(err).context(format!("{op} failed"))),
    }
}

#[async_trait]
impl<C> UsersRepository for SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let found = UserEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .map_err(|e| classify(e, "find_by_id"))?;
        Ok(found.map(Into::into))
    }

    async fn find_all(&self) -> Result<Vec<User>, RepoError> {
        let rows = UserEntity::find()
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .all(&self.conn)
            .await
            .map_err(|e| classify(e, "find_all"))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn exists(&self, id: Uuid) -> Result<bool, RepoError> {
        let count = UserEntity::find()
            .filter(Column::Id.eq(id))
            .count(&self.conn)
            .await
            .map_err(|e| classify(e, "exists"))?;
        Ok(count > 0)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, RepoError> {
        let count = UserEntity::find()
            .filter(Column::Email.eq(email))
            .count(&self.conn)
            .await
            .map_err(|e| classify(e, "email_exists"))?;
        Ok(count > 0)
    }

    async fn insert(&self, u: User) -> Result<(), RepoError> {
        contract_to_insert(u)
            .insert(&self.conn)
            .await
            .map(|_| ())
            .map_err(|e| classify(e, "insert"))
    }

    async fn update(&self, u: User) -> Result<(), RepoError> {
        contract_to_update(u)
            .update(&self.conn)
            .await
            .map(|_| ())
            .map_err(|e| classify(e, "update"))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let res = UserEntity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .map_err(|e| classify(e, "delete"))?;
        Ok(res.rows_affected > 0)
    }
}

#[async_trait]
impl UsersUnitOfWork for SeaOrmUsersRepository<DatabaseTransaction> {
    async fn commit(self: Box<Self>) -> Result<(), RepoError> {
        let Self { conn, gate } = *self;
        let res = conn.commit().await.map_err(|e| classify(e, "commit"));
        drop(gate);
        res
    }
}

/// Store over a shared connection pool; each `begin` opens a transaction.
#[derive(Clone)]
pub struct SeaOrmUsersStore {
    db: DatabaseConnection,
    sqlite_gate: Option<Arc<Mutex<()>>>,
}

impl SeaOrmUsersStore {
    pub fn new(db: DatabaseConnection) -> Self {
        let sqlite_gate = match db.get_database_backend() {
            DatabaseBackend::Sqlite => Some(Arc::new(Mutex::new(()))),
            _ => None,
        };
        Self { db, sqlite_gate }
    }
}

#[async_trait]
impl UsersStore for SeaOrmUsersStore {
    async fn begin(&self) -> Result<Box<dyn UsersUnitOfWork>, RepoError> {
        let gate = match &self.sqlite_gate {
            Some(m) => Some(Arc::clone(m).lock_owned().await),
            None => None,
        };
        let txn = self.db.begin().await.map_err(|e| classify(e, "begin"))?;
        Ok(Box::new(SeaOrmUsersRepository { conn: txn, gate }))
    }
}
