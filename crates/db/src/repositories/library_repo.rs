//! Repository for the `libraries` and `library_books` tables.

use std::collections::HashMap;

use folio_core::types::DbId;
use sqlx::PgPool;

use crate::models::library::{CreateLibrary, Library, UpdateLibrary};

const COLUMNS: &str = "id, name";

pub struct LibraryRepo;

impl LibraryRepo {
    pub async fn create(pool: &PgPool, input: &CreateLibrary) -> Result<Library, sqlx::Error> {
        let query = format!("INSERT INTO libraries (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Library>(&query)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Library>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM libraries WHERE id = $1");
        let library = sqlx::query_as::<_, Library>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        let Some(library) = library else {
            return Ok(None);
        };
        Ok(Self::with_books(pool, vec![library]).await?.pop())
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Library>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM libraries ORDER BY id");
        let libraries = sqlx::query_as::<_, Library>(&query).fetch_all(pool).await?;
        Self::with_books(pool, libraries).await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateLibrary,
    ) -> Result<Option<Library>, sqlx::Error> {
        let query = format!(
            "UPDATE libraries SET name = COALESCE($2, name)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let library = sqlx::query_as::<_, Library>(&query)
            .bind(id)
            .bind(&input.name)
            .fetch_optional(pool)
            .await?;
        let Some(library) = library else {
            return Ok(None);
        };
        Ok(Self::with_books(pool, vec![library]).await?.pop())
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM libraries WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Put a book on a library's shelf. Returns `false` if it was already there.
    pub async fn add_book(
        pool: &PgPool,
        library_id: DbId,
        book_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO library_books (library_id, book_id) VALUES ($1, $2)
             ON CONFLICT (library_id, book_id) DO NOTHING",
        )
        .bind(library_id)
        .bind(book_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn remove_book(
        pool: &PgPool,
        library_id: DbId,
        book_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM library_books WHERE library_id = $1 AND book_id = $2")
            .bind(library_id)
            .bind(book_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn with_books(
        pool: &PgPool,
        mut libraries: Vec<Library>,
    ) -> Result<Vec<Library>, sqlx::Error> {
        let ids: Vec<DbId> = libraries.iter().map(|l| l.id).collect();
        let rows: Vec<(DbId, DbId)> = sqlx::query_as(
            "SELECT library_id, book_id FROM library_books
             WHERE library_id = ANY($1)
             ORDER BY library_id, book_id",
        )
        .bind(&ids)
        .fetch_all(pool)
        .await?;

        let mut shelves: HashMap<DbId, Vec<DbId>> = HashMap::new();
        for (library_id, book_id) in rows {
            shelves.entry(library_id).or_default().push(book_id);
        }
        for library in &mut libraries {
            library.books = shelves.remove(&library.id).unwrap_or_default();
        }
        Ok(libraries)
    }
}
