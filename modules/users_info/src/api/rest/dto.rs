use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::contract::model::{User, UserData};

/// REST DTO for user representation with serde/utoipa
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[schema(value_type = String, format = Date, example = "2000-01-01")]
    pub birth_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "lastUpdate")]
    pub updated_at: DateTime<Utc>,
}

/// REST DTO for creating or replacing a user.
///
/// Every field is optional at the serde level so that a missing field is
/// reported by validation, not as a malformed body. Server-assigned fields
/// (`id`, `createdAt`, `lastUpdate`) are ignored if present.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserReq {
    #[validate(
        required(message = "name is required"),
        length(min = 4, max = 50, message = "name must be between 4 and 50 characters")
    )]
    pub name: Option<String>,

    #[validate(
        required(message = "email is required"),
        email(message = "invalid email format"),
        length(max = 254, message = "email must be at most 254 characters")
    )]
    pub email: Option<String>,

    #[validate(required(message = "birth date is required"))]
    #[schema(value_type = Option<String>, format = Date, example = "2000-01-01")]
    pub birth_date: Option<NaiveDate>,
}

/// A single rejected field, in wire naming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub reason: String,
}

impl FieldError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

// name, email, birthDate
const FIELD_ORDER: [(&str, &str); 3] = [
    ("name", "name"),
    ("email", "email"),
    ("birth_date", "birthDate"),
];

impl UserReq {
    /// Run every rule and return the field failures in declaration order.
    pub fn field_errors(&self, today: NaiveDate) -> Vec<FieldError> {
        let reported = self.validate().err().unwrap_or_else(ValidationErrors::new);
        let by_field = reported.field_errors();

        let mut out = Vec::new();
        for (rust_name, wire_name) in FIELD_ORDER {
            let first = by_field
                .iter()
                .find(|(k, _)| k.to_string() == rust_name)
                .and_then(|(_, errs)| errs.first());
            if let Some(err) = first {
                let reason = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                out.push(FieldError::new(wire_name, reason));
                continue;
            }

            // Rules the derive cannot express
            match rust_name {
                "name" if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) => {
                    out.push(FieldError::new(wire_name, "name is required"));
                }
                "birth_date" if self.birth_date.is_some_and(|d| d > today) => {
                    out.push(FieldError::new(
                        wire_name,
                        "birth date cannot be in the future",
                    ));
                }
                _ => {}
            }
        }
        out
    }

    /// Validated conversion into the domain input.
    pub fn into_user_data(self, today: NaiveDate) -> Result<UserData, FieldError> {
        if let Some(first) = self.field_errors(today).into_iter().next() {
            return Err(first);
        }
        match (self.name, self.email, self.birth_date) {
            (Some(name), Some(email), Some(birth_date)) => Ok(UserData {
                name,
                email,
                birth_date,
            }),
            _ => Err(FieldError::new("body", "incomplete user")),
        }
    }
}

// Conversion implementations between REST DTOs and contract models

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            birth_date: user.birth_date,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
