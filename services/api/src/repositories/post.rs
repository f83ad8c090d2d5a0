//! Post repository for database operations

use async_trait::async_trait;
use auth::User;
use common::error::DatabaseResult;
use sqlx::{PgPool, Row};
use tracing::info;

use super::PostRepository;
use crate::models::{NewPost, Post, PostChanges, PostId};

const SELECT_POSTS: &str = r#"
    SELECT p.id, p.text, p.pub_date, p.author_id, u.username AS author, p.image, p.group_id
    FROM posts p
    JOIN users u ON u.id = p.author_id
"#;

/// PostgreSQL post repository
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    /// Create a new post repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn list(&self) -> DatabaseResult<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(&format!("{} ORDER BY p.id", SELECT_POSTS))
            .fetch_all(&self.pool)
            .await?;

        Ok(posts)
    }

    async fn list_page(&self, limit: i64, offset: i64) -> DatabaseResult<(Vec<Post>, i64)> {
        // Count and window must come from one snapshot
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await?;

        let count: i64 = sqlx::query("SELECT COUNT(*) AS count FROM posts")
            .fetch_one(&mut *tx)
            .await?
            .get("count");

        let posts = sqlx::query_as::<_, Post>(&format!(
            "{} ORDER BY p.id LIMIT $1 OFFSET $2",
            SELECT_POSTS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((posts, count))
    }

    async fn find_by_id(&self, id: PostId) -> DatabaseResult<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!("{} WHERE p.id = $1", SELECT_POSTS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(post)
    }

    async fn create(&self, author: &User, new_post: &NewPost) -> DatabaseResult<Post> {
        info!("Creating post for author: {}", author.username);

        let row = sqlx::query(
            r#"
            INSERT INTO posts (text, author_id, image, group_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, text, pub_date, author_id, image, group_id
            "#,
        )
        .bind(&new_post.text)
        .bind(author.id)
        .bind(&new_post.image)
        .bind(new_post.group_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Post {
            id: row.get("id"),
            text: row.get("text"),
            pub_date: row.get("pub_date"),
            author_id: row.get("author_id"),
            author: author.username.clone(),
            image: row.get("image"),
            group_id: row.get("group_id"),
        })
    }

    async fn update(&self, id: PostId, changes: &PostChanges) -> DatabaseResult<Option<Post>> {
        info!("Updating post: {}", id);

        // Nullable columns take a "set" flag so an explicit null can clear them
        let post = sqlx::query_as::<_, Post>(
            r#"
            WITH updated AS (
                UPDATE posts SET
                    text = COALESCE($2, text),
                    image = CASE WHEN $3 THEN $4 ELSE image END,
                    group_id = CASE WHEN $5 THEN $6 ELSE group_id END
                WHERE id = $1
                RETURNING id, text, pub_date, author_id, image, group_id
            )
            SELECT p.id, p.text, p.pub_date, p.author_id, u.username AS author, p.image, p.group_id
            FROM updated p
            JOIN users u ON u.id = p.author_id
            "#,
        )
        .bind(id)
        .bind(&changes.text)
        .bind(changes.image.is_some())
        .bind(changes.image.clone().flatten())
        .bind(changes.group_id.is_some())
        .bind(changes.group_id.flatten())
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn delete(&self, id: PostId) -> DatabaseResult<bool> {
        info!("Deleting post: {}", id);

        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
