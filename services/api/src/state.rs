//! Application state shared across handlers

use std::sync::Arc;

use auth::{CredentialService, MemoryCredentialStore, PgTokenRepository, PgUserRepository};
use sqlx::PgPool;

use crate::{
    pagination::Pagination,
    repositories::{
        CommentRepository, FollowRepository, GroupRepository, MemoryStore, PgCommentRepository,
        PgFollowRepository, PgGroupRepository, PgPostRepository, PostRepository,
    },
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub credentials: CredentialService,
    pub posts: Arc<dyn PostRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub follows: Arc<dyn FollowRepository>,
    /// Page limits for the post list
    pub pagination: Pagination,
}

impl AppState {
    /// State backed by PostgreSQL
    pub fn postgres(pool: PgPool, pagination: Pagination) -> Self {
        Self {
            credentials: CredentialService::new(
                Arc::new(PgUserRepository::new(pool.clone())),
                Arc::new(PgTokenRepository::new(pool.clone())),
            ),
            posts: Arc::new(PgPostRepository::new(pool.clone())),
            groups: Arc::new(PgGroupRepository::new(pool.clone())),
            comments: Arc::new(PgCommentRepository::new(pool.clone())),
            follows: Arc::new(PgFollowRepository::new(pool)),
            pagination,
        }
    }

    /// State kept entirely in process memory
    pub fn in_memory(pagination: Pagination) -> Self {
        let credentials = MemoryCredentialStore::new();
        let store = MemoryStore::new();

        Self {
            credentials: CredentialService::new(
                Arc::new(credentials.clone()),
                Arc::new(credentials),
            ),
            posts: Arc::new(store.clone()),
            groups: Arc::new(store.clone()),
            comments: Arc::new(store.clone()),
            follows: Arc::new(store),
            pagination,
        }
    }
}
