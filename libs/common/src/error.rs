//! Custom error types for the common library
//!
//! This module defines the storage error type shared by every repository in
//! the workspace. Constraint violations reported by PostgreSQL are kept apart
//! from other query failures so callers can turn them into validation errors.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// A unique constraint rejected the write
    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    /// A check constraint rejected the write
    #[error("Check constraint violated: {constraint}")]
    CheckViolation { constraint: String },

    /// A foreign key constraint rejected the write
    #[error("Foreign key constraint violated: {constraint}")]
    ForeignKeyViolation { constraint: String },

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

impl DatabaseError {
    /// Returns true when the error is a constraint violation rather than an
    /// infrastructure failure.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            DatabaseError::UniqueViolation { .. }
                | DatabaseError::CheckViolation { .. }
                | DatabaseError::ForeignKeyViolation { .. }
        )
    }
}

impl From<SqlxError> for DatabaseError {
    fn from(err: SqlxError) -> Self {
        let (unique, check, foreign_key, constraint) = match err.as_database_error() {
            Some(db_err) => (
                db_err.is_unique_violation(),
                db_err.is_check_violation(),
                db_err.is_foreign_key_violation(),
                db_err.constraint().unwrap_or_default().to_string(),
            ),
            None => return DatabaseError::Query(err),
        };

        if unique {
            DatabaseError::UniqueViolation { constraint }
        } else if check {
            DatabaseError::CheckViolation { constraint }
        } else if foreign_key {
            DatabaseError::ForeignKeyViolation { constraint }
        } else {
            DatabaseError::Query(err)
        }
    }
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;
