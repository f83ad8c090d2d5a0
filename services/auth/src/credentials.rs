//! Credential service: password login and opaque token lookup

use std::sync::Arc;

use common::error::DatabaseError;
use tracing::{info, warn};

use crate::{
    error::{AuthError, AuthResult},
    models::{NewUser, User},
    password::{hash_password, verify_password},
    repositories::{TokenRepository, UserRepository},
    token::generate_key,
    validation::{validate_password, validate_username},
};

/// Issues and resolves API tokens on top of the user and token stores
#[derive(Clone)]
pub struct CredentialService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenRepository>,
}

impl CredentialService {
    /// Create a new credential service
    pub fn new(users: Arc<dyn UserRepository>, tokens: Arc<dyn TokenRepository>) -> Self {
        Self { users, tokens }
    }

    /// The user directory behind this service
    pub fn users(&self) -> &Arc<dyn UserRepository> {
        &self.users
    }

    /// Create a user out of band (administration, fixtures)
    pub async fn register_user(&self, username: &str, password: &str) -> AuthResult<User> {
        validate_username(username).map_err(AuthError::InvalidUsername)?;
        validate_password(password).map_err(AuthError::InvalidPassword)?;

        let new_user = NewUser {
            username: username.to_string(),
            password_hash: hash_password(password)?,
        };

        match self.users.create(&new_user).await {
            Ok(user) => Ok(user),
            Err(DatabaseError::UniqueViolation { .. }) => {
                Err(AuthError::UsernameTaken(username.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Exchange a username and password for the user's token.
    ///
    /// Returns `Ok(None)` when the credentials do not match a user. The same
    /// token is returned on every successful login.
    pub async fn obtain_token(&self, username: &str, password: &str) -> AuthResult<Option<String>> {
        let Some(user) = self.users.find_by_username(username).await? else {
            warn!("Login attempt for unknown user: {}", username);
            return Ok(None);
        };

        if !verify_password(password, &user.password_hash)? {
            warn!("Invalid password for user: {}", username);
            return Ok(None);
        }

        let token = self.tokens.get_or_create(user.id, &generate_key()).await?;
        info!("Issued token for user: {}", user.username);

        Ok(Some(token.key))
    }

    /// Resolve a presented token key to its user
    pub async fn authenticate(&self, key: &str) -> AuthResult<Option<User>> {
        Ok(self.tokens.find_user_by_key(key).await?)
    }
}
