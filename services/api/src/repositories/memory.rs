//! In-memory content store

use std::sync::Arc;

use async_trait::async_trait;
use auth::{User, UserId};
use chrono::Utc;
use common::error::{DatabaseError, DatabaseResult};
use tokio::sync::RwLock;

use super::{CommentRepository, FollowRepository, GroupRepository, PostRepository};
use crate::models::{
    Comment, CommentChanges, CommentId, Follow, Group, GroupId, NewComment, NewGroup, NewPost,
    Post, PostChanges, PostId,
};

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    posts: Vec<Post>,
    groups: Vec<Group>,
    comments: Vec<Comment>,
    follows: Vec<Follow>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn check_group(&self, group_id: Option<GroupId>) -> DatabaseResult<()> {
        match group_id {
            Some(id) if !self.groups.iter().any(|g| g.id == id) => {
                Err(DatabaseError::ForeignKeyViolation {
                    constraint: "posts_group_id_fkey".to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

/// Posts, groups, comments and follows kept in process memory.
///
/// Enforces the same constraints as the PostgreSQL schema: foreign keys on
/// groups and posts, cascading comment deletion, unique follow edges and no
/// self-follow.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn list(&self) -> DatabaseResult<Vec<Post>> {
        Ok(self.state.read().await.posts.clone())
    }

    async fn list_page(&self, limit: i64, offset: i64) -> DatabaseResult<(Vec<Post>, i64)> {
        let state = self.state.read().await;
        let page = state
            .posts
            .iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect();

        Ok((page, state.posts.len() as i64))
    }

    async fn find_by_id(&self, id: PostId) -> DatabaseResult<Option<Post>> {
        let state = self.state.read().await;
        Ok(state.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn create(&self, author: &User, new_post: &NewPost) -> DatabaseResult<Post> {
        let mut state = self.state.write().await;
        state.check_group(new_post.group_id)?;

        let post = Post {
            id: state.next_id(),
            text: new_post.text.clone(),
            pub_date: Utc::now(),
            author_id: author.id,
            author: author.username.clone(),
            image: new_post.image.clone(),
            group_id: new_post.group_id,
        };
        state.posts.push(post.clone());

        Ok(post)
    }

    async fn update(&self, id: PostId, changes: &PostChanges) -> DatabaseResult<Option<Post>> {
        let mut state = self.state.write().await;
        if let Some(group_id) = changes.group_id {
            state.check_group(group_id)?;
        }

        let Some(post) = state.posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        if let Some(text) = &changes.text {
            post.text = text.clone();
        }
        if let Some(image) = &changes.image {
            post.image = image.clone();
        }
        if let Some(group_id) = changes.group_id {
            post.group_id = group_id;
        }

        Ok(Some(post.clone()))
    }

    async fn delete(&self, id: PostId) -> DatabaseResult<bool> {
        let mut state = self.state.write().await;

        let before = state.posts.len();
        state.posts.retain(|p| p.id != id);
        let deleted = state.posts.len() < before;

        if deleted {
            state.comments.retain(|c| c.post_id != id);
        }

        Ok(deleted)
    }
}

#[async_trait]
impl GroupRepository for MemoryStore {
    async fn list(&self) -> DatabaseResult<Vec<Group>> {
        Ok(self.state.read().await.groups.clone())
    }

    async fn find_by_id(&self, id: GroupId) -> DatabaseResult<Option<Group>> {
        let state = self.state.read().await;
        Ok(state.groups.iter().find(|g| g.id == id).cloned())
    }

    async fn create(&self, new_group: &NewGroup) -> DatabaseResult<Group> {
        let mut state = self.state.write().await;

        if state.groups.iter().any(|g| g.slug == new_group.slug) {
            return Err(DatabaseError::UniqueViolation {
                constraint: "post_groups_slug_unique".to_string(),
            });
        }

        let group = Group {
            id: state.next_id(),
            title: new_group.title.clone(),
            slug: new_group.slug.clone(),
            description: new_group.description.clone(),
        };
        state.groups.push(group.clone());

        Ok(group)
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn list_for_post(&self, post_id: PostId) -> DatabaseResult<Vec<Comment>> {
        let state = self.state.read().await;
        Ok(state
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn find_for_post(&self, post_id: PostId, id: CommentId) -> DatabaseResult<Option<Comment>> {
        let state = self.state.read().await;
        Ok(state
            .comments
            .iter()
            .find(|c| c.post_id == post_id && c.id == id)
            .cloned())
    }

    async fn create(
        &self,
        author: &User,
        post_id: PostId,
        new_comment: &NewComment,
    ) -> DatabaseResult<Comment> {
        let mut state = self.state.write().await;

        if !state.posts.iter().any(|p| p.id == post_id) {
            return Err(DatabaseError::ForeignKeyViolation {
                constraint: "comments_post_id_fkey".to_string(),
            });
        }

        let comment = Comment {
            id: state.next_id(),
            author_id: author.id,
            author: author.username.clone(),
            post_id,
            text: new_comment.text.clone(),
            created: Utc::now(),
        };
        state.comments.push(comment.clone());

        Ok(comment)
    }

    async fn update(&self, id: CommentId, changes: &CommentChanges) -> DatabaseResult<Option<Comment>> {
        let mut state = self.state.write().await;

        let Some(comment) = state.comments.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if let Some(text) = &changes.text {
            comment.text = text.clone();
        }

        Ok(Some(comment.clone()))
    }

    async fn delete(&self, id: CommentId) -> DatabaseResult<bool> {
        let mut state = self.state.write().await;
        let before = state.comments.len();
        state.comments.retain(|c| c.id != id);
        Ok(state.comments.len() < before)
    }
}

#[async_trait]
impl FollowRepository for MemoryStore {
    async fn list_for_user(&self, user_id: UserId, terms: &[String]) -> DatabaseResult<Vec<Follow>> {
        let terms: Vec<String> = terms.iter().map(|t| t.to_lowercase()).collect();
        let state = self.state.read().await;

        Ok(state
            .follows
            .iter()
            .filter(|f| f.user_id == user_id)
            .filter(|f| {
                let following = f.following.to_lowercase();
                terms.iter().all(|t| following.contains(t.as_str()))
            })
            .cloned()
            .collect())
    }

    async fn exists(&self, user_id: UserId, following_id: UserId) -> DatabaseResult<bool> {
        let state = self.state.read().await;
        Ok(state
            .follows
            .iter()
            .any(|f| f.user_id == user_id && f.following_id == following_id))
    }

    async fn create(&self, user: &User, following: &User) -> DatabaseResult<Follow> {
        let mut state = self.state.write().await;

        if user.id == following.id {
            return Err(DatabaseError::CheckViolation {
                constraint: "follows_no_self_follow".to_string(),
            });
        }
        if state
            .follows
            .iter()
            .any(|f| f.user_id == user.id && f.following_id == following.id)
        {
            return Err(DatabaseError::UniqueViolation {
                constraint: "follows_user_following_unique".to_string(),
            });
        }

        let follow = Follow {
            id: state.next_id(),
            user_id: user.id,
            user: user.username.clone(),
            following_id: following.id,
            following: following.username.clone(),
        };
        state.follows.push(follow.clone());

        Ok(follow)
    }
}
