//! Comment entity

use auth::UserId;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::post::PostId;

pub type CommentId = i64;

/// A comment under exactly one post
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Comment {
    pub id: CommentId,
    pub author_id: UserId,
    /// Author username, joined from `users`
    pub author: String,
    pub post_id: PostId,
    pub text: String,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewComment {
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentChanges {
    pub text: Option<String>,
}
