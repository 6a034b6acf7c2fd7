//! Row counts for dashboards.

use sqlx::PgPool;

use crate::models::summary::Summary;

pub struct SummaryRepo;

impl SummaryRepo {
    pub async fn counts(pool: &PgPool) -> Result<Summary, sqlx::Error> {
        let (authors, books, libraries, posts, users): (i64, i64, i64, i64, i64) = sqlx::query_as(
            "SELECT
                (SELECT COUNT(*) FROM authors),
                (SELECT COUNT(*) FROM books),
                (SELECT COUNT(*) FROM libraries),
                (SELECT COUNT(*) FROM posts),
                (SELECT COUNT(*) FROM users)",
        )
        .fetch_one(pool)
        .await?;
        Ok(Summary {
            authors,
            books,
            libraries,
            posts,
            users,
        })
    }
}
