//! Follow repository for database operations

use async_trait::async_trait;
use auth::{User, UserId};
use common::error::DatabaseResult;
use sqlx::{PgPool, Row};
use tracing::info;

use super::{FollowRepository, contains_pattern};
use crate::models::Follow;

/// PostgreSQL follow repository
#[derive(Clone)]
pub struct PgFollowRepository {
    pool: PgPool,
}

impl PgFollowRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FollowRepository for PgFollowRepository {
    async fn list_for_user(&self, user_id: UserId, terms: &[String]) -> DatabaseResult<Vec<Follow>> {
        let patterns: Vec<String> = terms.iter().map(|t| contains_pattern(t)).collect();

        // ILIKE ALL over an empty array is true, so no terms means no filter
        let follows = sqlx::query_as::<_, Follow>(
            r#"
            SELECT f.id, f.user_id, u.username AS "user", f.following_id, t.username AS following
            FROM follows f
            JOIN users u ON u.id = f.user_id
            JOIN users t ON t.id = f.following_id
            WHERE f.user_id = $1 AND t.username ILIKE ALL($2)
            ORDER BY f.id
            "#,
        )
        .bind(user_id)
        .bind(&patterns)
        .fetch_all(&self.pool)
        .await?;

        Ok(follows)
    }

    async fn exists(&self, user_id: UserId, following_id: UserId) -> DatabaseResult<bool> {
        let exists: bool = sqlx::query(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM follows WHERE user_id = $1 AND following_id = $2
            ) AS present
            "#,
        )
        .bind(user_id)
        .bind(following_id)
        .fetch_one(&self.pool)
        .await?
        .get("present");

        Ok(exists)
    }

    async fn create(&self, user: &User, following: &User) -> DatabaseResult<Follow> {
        info!("{} follows {}", user.username, following.username);

        let id: i64 = sqlx::query(
            r#"
            INSERT INTO follows (user_id, following_id)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(user.id)
        .bind(following.id)
        .fetch_one(&self.pool)
        .await?
        .get("id");

        Ok(Follow {
            id,
            user_id: user.id,
            user: user.username.clone(),
            following_id: following.id,
            following: following.username.clone(),
        })
    }
}
