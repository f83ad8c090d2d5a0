//! Storage seams for users and tokens
//!
//! PostgreSQL implementations back the running service; the in-memory store
//! backs tests and local experiments.

use async_trait::async_trait;
use common::error::DatabaseResult;

use crate::models::{NewUser, Token, User, user::UserId};

pub mod memory;
pub mod token;
pub mod user;

pub use memory::MemoryCredentialStore;
pub use token::PgTokenRepository;
pub use user::PgUserRepository;

/// User lookups and out-of-band creation
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. A taken username surfaces as
    /// `DatabaseError::UniqueViolation`.
    async fn create(&self, new_user: &NewUser) -> DatabaseResult<User>;

    /// Find a user by exact username
    async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>>;
}

/// One opaque token per user
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Return the user's token, creating it with `candidate_key` when the user
    /// has none yet.
    async fn get_or_create(&self, user_id: UserId, candidate_key: &str) -> DatabaseResult<Token>;

    /// Resolve a token key to its user
    async fn find_user_by_key(&self, key: &str) -> DatabaseResult<Option<User>>;
}
