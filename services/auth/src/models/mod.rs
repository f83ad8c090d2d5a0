//! Authentication models

pub mod token;
pub mod user;

// Re-export for convenience
pub use token::Token;
pub use user::{NewUser, User};
