use sea_orm::{ActiveValue::NotSet, Set};

use crate::contract::model::User;
use crate::infra::storage::entity::{ActiveModel as UserAM, Model as UserEntity};

/// Convert a database entity to a contract model
pub fn entity_to_contract(entity: UserEntity) -> User {
    User {
        id: entity.id,
        name: entity.name,
        email: entity.email,
        birth_date: entity.birth_date,
        created_at: entity.created_at,
        updated_at: entity.updated_at,
    }
}

/// Active model for a fresh row: every column is written.
pub fn contract_to_insert(u: User) -> UserAM {
    UserAM {
        id: Set(u.id),
        name: Set(u.name),
        email: Set(u.email),
        birth_date: Set(u.birth_date),
        created_at: Set(u.created_at),
        updated_at: Set(u.updated_at),
    }
}

/// Active model for an update by primary key. `created_at` stays untouched.
pub fn contract_to_update(u: User) -> UserAM {
    UserAM {
        id: Set(u.id),
        name: Set(u.name),
        email: Set(u.email),
        birth_date: Set(u.birth_date),
        created_at: NotSet,
        updated_at: Set(u.updated_at),
    }
}

impl From<UserEntity> for User {
    fn from(entity: UserEntity) -> Self {
        entity_to_contract(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use sea_orm::ActiveValue;
    use uuid::Uuid;

    fn sample() -> User {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        User {
            id: Uuid::nil(),
            name: "Fulano".to_string(),
            email: "fulano@email.com".to_string(),
            birth_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn update_model_never_writes_created_at() {
        let am = contract_to_update(sample());
        assert!(matches!(am.created_at, ActiveValue::NotSet));
        assert!(matches!(am.updated_at, ActiveValue::Set(_)));
        assert_eq!(am.email, ActiveValue::Set("fulano@email.com".to_string()));
    }

    #[test]
    fn insert_model_writes_every_column() {
        let u = sample();
        let am = contract_to_insert(u.clone());
        assert_eq!(am.id, ActiveValue::Set(u.id));
        assert_eq!(am.created_at, ActiveValue::Set(u.created_at));
        assert_eq!(am.birth_date, ActiveValue::Set(u.birth_date));
    }
}
