//! In-memory user and token store

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use common::error::{DatabaseError, DatabaseResult};
use tokio::sync::RwLock;

use super::{TokenRepository, UserRepository};
use crate::models::{NewUser, Token, User, user::UserId};

#[derive(Debug, Default)]
struct State {
    next_id: UserId,
    users: Vec<User>,
    tokens: HashMap<UserId, Token>,
}

/// Users and tokens kept in process memory.
///
/// Mirrors the constraints of the PostgreSQL schema: unique usernames and at
/// most one token per user.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    state: Arc<RwLock<State>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryCredentialStore {
    async fn create(&self, new_user: &NewUser) -> DatabaseResult<User> {
        let mut state = self.state.write().await;

        if state.users.iter().any(|u| u.username == new_user.username) {
            return Err(DatabaseError::UniqueViolation {
                constraint: "users_username_unique".to_string(),
            });
        }

        state.next_id += 1;
        let user = User {
            id: state.next_id,
            username: new_user.username.clone(),
            password_hash: new_user.password_hash.clone(),
            created_at: Utc::now(),
        };
        state.users.push(user.clone());

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }
}

#[async_trait]
impl TokenRepository for MemoryCredentialStore {
    async fn get_or_create(&self, user_id: UserId, candidate_key: &str) -> DatabaseResult<Token> {
        let mut state = self.state.write().await;

        if !state.users.iter().any(|u| u.id == user_id) {
            return Err(DatabaseError::ForeignKeyViolation {
                constraint: "auth_tokens_user_id_fkey".to_string(),
            });
        }

        let token = state.tokens.entry(user_id).or_insert_with(|| Token {
            key: candidate_key.to_string(),
            user_id,
            created_at: Utc::now(),
        });

        Ok(token.clone())
    }

    async fn find_user_by_key(&self, key: &str) -> DatabaseResult<Option<User>> {
        let state = self.state.read().await;

        let user = state
            .tokens
            .values()
            .find(|t| t.key == key)
            .and_then(|t| state.users.iter().find(|u| u.id == t.user_id))
            .cloned();

        Ok(user)
    }
}
