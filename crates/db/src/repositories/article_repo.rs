//! Repository for the `articles` table.

use folio_core::types::DbId;
use sqlx::PgPool;

use crate::models::article::{Article, CreateArticle, UpdateArticle};

const COLUMNS: &str = "id, title, content, author_id, created_at";

pub struct ArticleRepo;

impl ArticleRepo {
    pub async fn create(pool: &PgPool, input: &CreateArticle) -> Result<Article, sqlx::Error> {
        let query = format!(
            "INSERT INTO articles (title, content, author_id)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Article>(&query)
            .bind(&input.title)
            .bind(&input.content)
            .bind(input.author_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Article>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM articles WHERE id = $1");
        sqlx::query_as::<_, Article>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Article>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM articles ORDER BY id");
        sqlx::query_as::<_, Article>(&query).fetch_all(pool).await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateArticle,
    ) -> Result<Option<Article>, sqlx::Error> {
        let query = format!(
            "UPDATE articles SET
                title = COALESCE($2, title),
                content = COALESCE($3, content)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Article>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.content)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
