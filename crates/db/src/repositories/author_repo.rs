//! Repository for the `authors` table.

use folio_core::types::DbId;
use sqlx::PgPool;

use crate::models::author::{Author, CreateAuthor, UpdateAuthor};
use crate::models::book::Book;
use crate::repositories::BookRepo;

const COLUMNS: &str = "id, name";

/// Provides CRUD operations for authors. Each returned author has its books
/// attached.
pub struct AuthorRepo;

impl AuthorRepo {
    pub async fn create(pool: &PgPool, input: &CreateAuthor) -> Result<Author, sqlx::Error> {
        let query = format!("INSERT INTO authors (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Author>(&query)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Author>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM authors WHERE id = $1");
        let author = sqlx::query_as::<_, Author>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        let Some(author) = author else {
            return Ok(None);
        };
        Ok(Self::with_books(pool, vec![author]).await?.pop())
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Author>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM authors ORDER BY id");
        let authors = sqlx::query_as::<_, Author>(&query).fetch_all(pool).await?;
        Self::with_books(pool, authors).await
    }

    /// Update an author. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAuthor,
    ) -> Result<Option<Author>, sqlx::Error> {
        let query = format!(
            "UPDATE authors SET name = COALESCE($2, name)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let author = sqlx::query_as::<_, Author>(&query)
            .bind(id)
            .bind(&input.name)
            .fetch_optional(pool)
            .await?;
        let Some(author) = author else {
            return Ok(None);
        };
        Ok(Self::with_books(pool, vec![author]).await?.pop())
    }

    /// Delete an author. Their books go with them via `ON DELETE CASCADE`.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn with_books(
        pool: &PgPool,
        mut authors: Vec<Author>,
    ) -> Result<Vec<Author>, sqlx::Error> {
        let ids: Vec<DbId> = authors.iter().map(|a| a.id).collect();
        let books = BookRepo::list_by_authors(pool, &ids).await?;
        for author in &mut authors {
            author.books = books
                .iter()
                .filter(|b: &&Book| b.author_id == author.id)
                .cloned()
                .collect();
        }
        Ok(authors)
    }
}
