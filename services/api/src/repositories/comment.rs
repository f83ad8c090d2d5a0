//! Comment repository for database operations

use async_trait::async_trait;
use auth::User;
use common::error::DatabaseResult;
use sqlx::{PgPool, Row};
use tracing::info;

use super::CommentRepository;
use crate::models::{Comment, CommentChanges, CommentId, NewComment, PostId};

/// PostgreSQL comment repository
#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn list_for_post(&self, post_id: PostId) -> DatabaseResult<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT c.id, c.author_id, u.username AS author, c.post_id, c.text, c.created
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.post_id = $1
            ORDER BY c.id
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    async fn find_for_post(&self, post_id: PostId, id: CommentId) -> DatabaseResult<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT c.id, c.author_id, u.username AS author, c.post_id, c.text, c.created
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.post_id = $1 AND c.id = $2
            "#,
        )
        .bind(post_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn create(
        &self,
        author: &User,
        post_id: PostId,
        new_comment: &NewComment,
    ) -> DatabaseResult<Comment> {
        info!("Creating comment on post {} for {}", post_id, author.username);

        let row = sqlx::query(
            r#"
            INSERT INTO comments (author_id, post_id, text)
            VALUES ($1, $2, $3)
            RETURNING id, author_id, post_id, text, created
            "#,
        )
        .bind(author.id)
        .bind(post_id)
        .bind(&new_comment.text)
        .fetch_one(&self.pool)
        .await?;

        Ok(Comment {
            id: row.get("id"),
            author_id: row.get("author_id"),
            author: author.username.clone(),
            post_id: row.get("post_id"),
            text: row.get("text"),
            created: row.get("created"),
        })
    }

    async fn update(&self, id: CommentId, changes: &CommentChanges) -> DatabaseResult<Option<Comment>> {
        info!("Updating comment: {}", id);

        let comment = sqlx::query_as::<_, Comment>(
            r#"
            WITH updated AS (
                UPDATE comments SET text = COALESCE($2, text)
                WHERE id = $1
                RETURNING id, author_id, post_id, text, created
            )
            SELECT c.id, c.author_id, u.username AS author, c.post_id, c.text, c.created
            FROM updated c
            JOIN users u ON u.id = c.author_id
            "#,
        )
        .bind(id)
        .bind(&changes.text)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn delete(&self, id: CommentId) -> DatabaseResult<bool> {
        info!("Deleting comment: {}", id);

        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
