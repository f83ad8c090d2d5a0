//! API token model

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::user::UserId;

/// Opaque bearer token bound to exactly one user
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Token {
    pub key: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}
