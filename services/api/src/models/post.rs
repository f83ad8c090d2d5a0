//! Post entity

use auth::UserId;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::group::GroupId;

pub type PostId = i64;

/// A published post
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Post {
    pub id: PostId,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: UserId,
    /// Author username, joined from `users`
    pub author: String,
    pub image: Option<String>,
    pub group_id: Option<GroupId>,
}

/// Fields a client may set when creating a post
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPost {
    pub text: String,
    pub image: Option<String>,
    pub group_id: Option<GroupId>,
}

/// Fields a client may change; `None` leaves the column untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostChanges {
    pub text: Option<String>,
    pub image: Option<Option<String>>,
    pub group_id: Option<Option<GroupId>>,
}
