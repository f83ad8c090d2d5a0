//! User model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Primary key of a user row
pub type UserId = i64;

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for User {}

/// New user creation payload
///
/// `password_hash` must already be an argon2 PHC string; use
/// [`crate::CredentialService::register_user`] to hash a plain password.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: UserId, username: &str) -> User {
        User {
            id,
            username: username.to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_password_hash_is_never_serialized() {
        let value = serde_json::to_value(user(1, "leo")).unwrap();
        assert_eq!(value["username"], "leo");
        assert!(value.get("password_hash").is_none());
    }

    #[test]
    fn test_users_compare_by_identity() {
        assert_eq!(user(7, "leo"), user(7, "renamed"));
        assert_ne!(user(7, "leo"), user(8, "leo"));
    }
}
