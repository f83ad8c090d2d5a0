//! Follow edge

use auth::UserId;
use sqlx::FromRow;

/// Directed edge: `user` follows `following`
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Follow {
    pub id: i64,
    pub user_id: UserId,
    pub user: String,
    pub following_id: UserId,
    pub following: String,
}
