use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// Pure user model shared across layers (no serde/utoipa)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub birth_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-settable user fields, used for both create and full replacement.
///
/// Server-assigned fields (id, timestamps) are deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserData {
    pub name: String,
    pub email: String,
    pub birth_date: NaiveDate,
}
