//! Credential service for the Yatube API
//!
//! Users are created out of band. A user exchanges a username and password
//! for an opaque token once, then presents that token on every request.

pub mod credentials;
pub mod error;
pub mod models;
pub mod password;
pub mod repositories;
pub mod token;
pub mod validation;

pub use credentials::CredentialService;
pub use error::{AuthError, AuthResult};
pub use models::{User, user::UserId};
pub use repositories::{
    MemoryCredentialStore, PgTokenRepository, PgUserRepository, TokenRepository, UserRepository,
};
