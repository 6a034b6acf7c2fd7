//! Repository for the `comments` table.

use folio_core::types::DbId;
use sqlx::PgPool;

use crate::models::comment::{Comment, CreateComment, UpdateComment};

const COLUMNS: &str = "id, post_id, author_id, content, created_at, updated_at";

pub struct CommentRepo;

impl CommentRepo {
    pub async fn create(pool: &PgPool, input: &CreateComment) -> Result<Comment, sqlx::Error> {
        let query = format!(
            "INSERT INTO comments (post_id, author_id, content)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(input.post_id)
            .bind(input.author_id)
            .bind(&input.content)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM comments WHERE id = $1");
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Comment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM comments ORDER BY id");
        sqlx::query_as::<_, Comment>(&query).fetch_all(pool).await
    }

    pub async fn list_by_post(pool: &PgPool, post_id: DbId) -> Result<Vec<Comment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM comments WHERE post_id = $1 ORDER BY id");
        sqlx::query_as::<_, Comment>(&query)
            .bind(post_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateComment,
    ) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!(
            "UPDATE comments SET
                content = COALESCE($2, content),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .bind(&input.content)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
