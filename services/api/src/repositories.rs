//! Repositories for the content resources
//!
//! Handlers only see the traits; [`AppState`](crate::state::AppState) wires
//! either the PostgreSQL implementations or the in-memory [`MemoryStore`].

use async_trait::async_trait;
use auth::{User, UserId};
use common::error::DatabaseResult;

use crate::models::{
    Comment, CommentChanges, CommentId, Follow, Group, GroupId, NewComment, NewGroup, NewPost,
    Post, PostChanges, PostId,
};

pub mod comment;
pub mod follow;
pub mod group;
pub mod memory;
pub mod post;

pub use comment::PgCommentRepository;
pub use follow::PgFollowRepository;
pub use group::PgGroupRepository;
pub use memory::MemoryStore;
pub use post::PgPostRepository;

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// All posts, oldest first
    async fn list(&self) -> DatabaseResult<Vec<Post>>;

    /// One window of posts and the total count
    async fn list_page(&self, limit: i64, offset: i64) -> DatabaseResult<(Vec<Post>, i64)>;

    async fn find_by_id(&self, id: PostId) -> DatabaseResult<Option<Post>>;

    async fn create(&self, author: &User, new_post: &NewPost) -> DatabaseResult<Post>;

    /// Apply `changes`; `None` if the post no longer exists
    async fn update(&self, id: PostId, changes: &PostChanges) -> DatabaseResult<Option<Post>>;

    /// Delete a post and its comments; `false` if it did not exist
    async fn delete(&self, id: PostId) -> DatabaseResult<bool>;
}

#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn list(&self) -> DatabaseResult<Vec<Group>>;

    async fn find_by_id(&self, id: GroupId) -> DatabaseResult<Option<Group>>;

    /// Out-of-band creation; groups are read-only over HTTP
    async fn create(&self, new_group: &NewGroup) -> DatabaseResult<Group>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn list_for_post(&self, post_id: PostId) -> DatabaseResult<Vec<Comment>>;

    /// A comment, only if it belongs to `post_id`
    async fn find_for_post(&self, post_id: PostId, id: CommentId) -> DatabaseResult<Option<Comment>>;

    async fn create(
        &self,
        author: &User,
        post_id: PostId,
        new_comment: &NewComment,
    ) -> DatabaseResult<Comment>;

    async fn update(&self, id: CommentId, changes: &CommentChanges) -> DatabaseResult<Option<Comment>>;

    async fn delete(&self, id: CommentId) -> DatabaseResult<bool>;
}

#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Edges where `user_id` is the follower, optionally narrowed to followed
    /// usernames containing every one of `terms` (case-insensitive)
    async fn list_for_user(&self, user_id: UserId, terms: &[String]) -> DatabaseResult<Vec<Follow>>;

    async fn exists(&self, user_id: UserId, following_id: UserId) -> DatabaseResult<bool>;

    async fn create(&self, user: &User, following: &User) -> DatabaseResult<Follow>;
}

/// `ILIKE` pattern matching `term` anywhere
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("bob"), "%bob%");
        assert_eq!(contains_pattern("50%_a\\b"), "%50\\%\\_a\\\\b%");
    }
}
