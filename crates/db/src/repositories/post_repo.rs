//! Repository for the `posts` table.

use folio_core::types::DbId;
use sqlx::PgPool;

use crate::models::post::{CreatePost, Post, UpdatePost};

const COLUMNS: &str = "id, title, content, author_id, created_at, updated_at";

pub struct PostRepo;

impl PostRepo {
    pub async fn create(pool: &PgPool, input: &CreatePost) -> Result<Post, sqlx::Error> {
        let query = format!(
            "INSERT INTO posts (title, content, author_id)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(&input.title)
            .bind(&input.content)
            .bind(input.author_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Post>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM posts WHERE id = $1");
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Post>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM posts ORDER BY id");
        sqlx::query_as::<_, Post>(&query).fetch_all(pool).await
    }

    /// Posts written by anyone `follower_id` follows, newest first.
    pub async fn list_followed(pool: &PgPool, follower_id: DbId) -> Result<Vec<Post>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM posts
             WHERE author_id IN (SELECT followee_id FROM follows WHERE follower_id = $1)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(follower_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePost,
    ) -> Result<Option<Post>, sqlx::Error> {
        let query = format!(
            "UPDATE posts SET
                title = COALESCE($2, title),
                content = COALESCE($3, content),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.content)
            .fetch_optional(pool)
            .await
    }

    /// Delete a post. Its comments go with it via `ON DELETE CASCADE`.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
