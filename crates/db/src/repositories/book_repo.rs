//! Repository for the `books` table.
//!
//! Every read joins `authors` so the returned [`Book`] carries its author's
//! name for filtering and search.

use folio_core::types::DbId;
use sqlx::PgPool;

use crate::models::book::{Book, CreateBook, UpdateBook};

/// Select list over `books b JOIN authors a`.
const COLUMNS: &str = "b.id, b.title, b.publication_year, b.author_id, a.name AS author_name";

pub struct BookRepo;

impl BookRepo {
    pub async fn create(pool: &PgPool, input: &CreateBook) -> Result<Book, sqlx::Error> {
        let query = format!(
            "WITH b AS (
                INSERT INTO books (title, publication_year, author_id)
                VALUES ($1, $2, $3)
                RETURNING id, title, publication_year, author_id
             )
             SELECT {COLUMNS} FROM b JOIN authors a ON a.id = b.author_id"
        );
        sqlx::query_as::<_, Book>(&query)
            .bind(&input.title)
            .bind(input.publication_year)
            .bind(input.author_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Book>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM books b JOIN authors a ON a.id = b.author_id WHERE b.id = $1"
        );
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Book>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM books b JOIN authors a ON a.id = b.author_id ORDER BY b.id"
        );
        sqlx::query_as::<_, Book>(&query).fetch_all(pool).await
    }

    pub async fn list_by_authors(
        pool: &PgPool,
        author_ids: &[DbId],
    ) -> Result<Vec<Book>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM books b JOIN authors a ON a.id = b.author_id
             WHERE b.author_id = ANY($1)
             ORDER BY b.id"
        );
        sqlx::query_as::<_, Book>(&query)
            .bind(author_ids)
            .fetch_all(pool)
            .await
    }

    /// Books shelved in a library, ordered by title.
    pub async fn list_by_library(
        pool: &PgPool,
        library_id: DbId,
    ) -> Result<Vec<Book>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM books b
             JOIN authors a ON a.id = b.author_id
             JOIN library_books lb ON lb.book_id = b.id
             WHERE lb.library_id = $1
             ORDER BY b.title, b.id"
        );
        sqlx::query_as::<_, Book>(&query)
            .bind(library_id)
            .fetch_all(pool)
            .await
    }

    /// Update a book. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateBook,
    ) -> Result<Option<Book>, sqlx::Error> {
        let query = format!(
            "WITH b AS (
                UPDATE books SET
                    title = COALESCE($2, title),
                    publication_year = COALESCE($3, publication_year),
                    author_id = COALESCE($4, author_id)
                WHERE id = $1
                RETURNING id, title, publication_year, author_id
             )
             SELECT {COLUMNS} FROM b JOIN authors a ON a.id = b.author_id"
        );
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(input.publication_year)
            .bind(input.author_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
