//! In-memory store double shared by the workflow tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{NaiveDate, SubsecRound, Utc};
use uuid::Uuid;

use users_info::contract::model::{User, UserData};
use users_info::domain::repo::{RepoError, UsersRepository, UsersStore, UsersUnitOfWork};

/// Knobs for failure injection.
#[derive(Debug, Clone, Default)]
pub struct Faults {
    /// `begin` fails with an opaque store error.
    pub fail_begin: bool,
    /// `email_exists` says no but the write hits the unique constraint,
    /// as if a concurrent writer committed in between.
    pub race_on_write: bool,
    /// `delete` reports a foreign key violation.
    pub referenced_on_delete: bool,
}

#[derive(Debug, Default)]
struct State {
    users: Vec<User>,
    commits: usize,
    faults: Faults,
}

/// Store whose units of work stage changes on a copy and publish them on commit.
#[derive(Clone, Default)]
pub struct MockStore {
    state: Arc<Mutex<State>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_faults(faults: Faults) -> Self {
        let store = Self::new();
        store.state.lock().unwrap().faults = faults;
        store
    }

    pub fn seed(&self, user: User) {
        self.state.lock().unwrap().users.push(user);
    }

    pub fn users(&self) -> Vec<User> {
        self.state.lock().unwrap().users.clone()
    }

    pub fn commits(&self) -> usize {
        self.state.lock().unwrap().commits
    }
}

#[async_trait]
impl UsersStore for MockStore {
    async fn begin(&self) -> Result<Box<dyn UsersUnitOfWork>, RepoError> {
        let st = self.state.lock().unwrap();
        if st.faults.fail_begin {
            return Err(RepoError::Other(anyhow!("connection pool timed out")));
        }
        Ok(Box::new(MockUnitOfWork {
            staged: Mutex::new(st.users.clone()),
            faults: st.faults.clone(),
            state: self.state.clone(),
        }))
    }
}

struct MockUnitOfWork {
    staged: Mutex<Vec<User>>,
    faults: Faults,
    state: Arc<Mutex<State>>,
}

#[async_trait]
impl UsersRepository for MockUnitOfWork {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.staged.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<User>, RepoError> {
        let mut all = self.staged.lock().unwrap().clone();
        all.sort_by_key(|u| (u.created_at, u.id));
        Ok(all)
    }

    async fn exists(&self, id: Uuid) -> Result<bool, RepoError> {
        Ok(self.staged.lock().unwrap().iter().any(|u| u.id == id))
    }

    async fn email_exists(&self, email: &str) -> Result<bool, RepoError> {
        Ok(self.staged.lock().unwrap().iter().any(|u| u.email == email))
    }

    async fn insert(&self, u: User) -> Result<(), RepoError> {
        if self.faults.race_on_write {
            return Err(RepoError::UniqueViolation("users.email".into()));
        }
        self.staged.lock().unwrap().push(u);
        Ok(())
    }

    async fn update(&self, u: User) -> Result<(), RepoError> {
        if self.faults.race_on_write {
            return Err(RepoError::UniqueViolation("users.email".into()));
        }
        let mut staged = self.staged.lock().unwrap();
        match staged.iter_mut().find(|x| x.id == u.id) {
            Some(slot) => {
                slot.name = u.name;
                slot.email = u.email;
                slot.birth_date = u.birth_date;
                slot.updated_at = u.updated_at;
                Ok(())
            }
            None => Err(RepoError::Other(anyhow!("update failed: no row"))),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        if self.faults.referenced_on_delete {
            return Err(RepoError::ForeignKeyViolation("user_notes.user_id".into()));
        }
        let mut staged = self.staged.lock().unwrap();
        let before = staged.len();
        staged.retain(|u| u.id != id);
        Ok(staged.len() < before)
    }
}

#[async_trait]
impl UsersUnitOfWork for MockUnitOfWork {
    async fn commit(self: Box<Self>) -> Result<(), RepoError> {
        let this = *self;
        let staged = this.staged.into_inner().unwrap();
        let mut st = this.state.lock().unwrap();
        st.users = staged;
        st.commits += 1;
        Ok(())
    }
}

pub fn sample_user(email: &str) -> User {
    let now = Utc::now().trunc_subsecs(6);
    User {
        id: Uuid::now_v7(),
        name: "Fulano".to_string(),
        email: email.to_string(),
        birth_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
        created_at: now,
        updated_at: now,
    }
}

pub fn input(name: &str, email: &str) -> UserData {
    UserData {
        name: name.to_string(),
        email: email.to_string(),
        birth_date: NaiveDate::from_ymd_opt(1995, 7, 20).unwrap(),
    }
}
