//! Error types for the credential service

use common::error::DatabaseError;
use thiserror::Error;

/// Credential service errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Username failed validation
    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    /// Password failed validation
    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    /// A user with this username already exists
    #[error("Username already taken: {0}")]
    UsernameTaken(String),

    /// Hashing or parsing a password hash failed
    #[error("Password hash error: {0}")]
    PasswordHash(String),

    /// Database error
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Type alias for credential service results
pub type AuthResult<T> = Result<T, AuthError>;
