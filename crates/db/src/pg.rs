//! PostgreSQL [`Store`] built on the repositories.
//!
//! Constraint violations are translated to [`StoreError::Integrity`] using the
//! constraint names from the migrations.

use async_trait::async_trait;
use folio_core::error::FieldErrors;
use folio_core::types::DbId;
use sqlx::postgres::PgDatabaseError;

use crate::memory::{MSG_BOOK_NOT_UNIQUE, MSG_LIBRARY_NAME_TAKEN, MSG_USERNAME_TAKEN};
use crate::models::article::{Article, CreateArticle, UpdateArticle};
use crate::models::author::{Author, CreateAuthor, UpdateAuthor};
use crate::models::book::{Book, CreateBook, UpdateBook};
use crate::models::comment::{Comment, CreateComment, UpdateComment};
use crate::models::library::{CreateLibrary, Library, UpdateLibrary};
use crate::models::post::{CreatePost, Post, UpdatePost};
use crate::models::summary::Summary;
use crate::models::user::{CreateUser, User};
use crate::repositories::{
    ArticleRepo, AuthorRepo, BookRepo, CommentRepo, LibraryRepo, PostRepo, SummaryRepo, UserRepo,
};
use crate::store::{Directory, Repository, Scope, Shelves, Store, StoreError, StoreResult};
use crate::DbPool;

const FOREIGN_KEY_VIOLATION: &str = "23503";
const UNIQUE_VIOLATION: &str = "23505";
const CHECK_VIOLATION: &str = "23514";

/// Field reported for each foreign key constraint.
const FOREIGN_KEYS: &[(&str, &str)] = &[
    ("fk_books_author", "author"),
    ("fk_library_books_library", "library"),
    ("fk_library_books_book", "book"),
    ("fk_follows_follower", "follower"),
    ("fk_follows_followee", "followee"),
    ("fk_posts_author", "author"),
    ("fk_comments_post", "post"),
    ("fk_comments_author", "author"),
    ("fk_articles_author", "author"),
];

/// Field and message reported for each unique constraint.
const UNIQUE_KEYS: &[(&str, &str, &str)] = &[
    ("uq_books_title_author", FieldErrors::NON_FIELD, MSG_BOOK_NOT_UNIQUE),
    ("uq_libraries_name", "name", MSG_LIBRARY_NAME_TAKEN),
    ("uq_users_username", "username", MSG_USERNAME_TAKEN),
];

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Map a sqlx error onto the store's error vocabulary.
pub fn classify(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => {
            return StoreError::Unavailable(err.to_string());
        }
        sqlx::Error::Database(db) => {
            let code = db.code();
            let constraint = db.constraint().unwrap_or_default();
            match code.as_deref() {
                Some(FOREIGN_KEY_VIOLATION) => {
                    if let Some((_, field)) =
                        FOREIGN_KEYS.iter().find(|(name, _)| *name == constraint)
                    {
                        let id = db
                            .try_downcast_ref::<PgDatabaseError>()
                            .and_then(|pg| pg.detail())
                            .and_then(key_value)
                            .unwrap_or("?");
                        return StoreError::missing_reference(*field, id);
                    }
                }
                Some(UNIQUE_VIOLATION) => {
                    if let Some((_, field, message)) =
                        UNIQUE_KEYS.iter().find(|(name, _, _)| *name == constraint)
                    {
                        return StoreError::integrity(*field, *message);
                    }
                }
                Some(CHECK_VIOLATION) => {
                    return StoreError::integrity(FieldErrors::NON_FIELD, db.message().to_string());
                }
                _ => {}
            }
        }
        _ => {}
    }
    StoreError::Database(err)
}

/// Pull `99` out of `Key (author_id)=(99) is not present in table "authors".`
fn key_value(detail: &str) -> Option<&str> {
    let start = detail.find(")=(")? + 3;
    let len = detail[start..].find(')')?;
    Some(&detail[start..start + len])
}

#[async_trait]
impl Repository<Author> for PgStore {
    async fn list(&self, _scope: Scope) -> StoreResult<Vec<Author>> {
        AuthorRepo::list(&self.pool).await.map_err(classify)
    }

    async fn find(&self, id: DbId) -> StoreResult<Option<Author>> {
        AuthorRepo::find_by_id(&self.pool, id).await.map_err(classify)
    }

    async fn create(&self, draft: CreateAuthor) -> StoreResult<Author> {
        AuthorRepo::create(&self.pool, &draft).await.map_err(classify)
    }

    async fn update(&self, id: DbId, changes: UpdateAuthor) -> StoreResult<Option<Author>> {
        AuthorRepo::update(&self.pool, id, &changes).await.map_err(classify)
    }

    async fn delete(&self, id: DbId) -> StoreResult<bool> {
        AuthorRepo::delete(&self.pool, id).await.map_err(classify)
    }
}

#[async_trait]
impl Repository<Book> for PgStore {
    async fn list(&self, _scope: Scope) -> StoreResult<Vec<Book>> {
        BookRepo::list(&self.pool).await.map_err(classify)
    }

    async fn find(&self, id: DbId) -> StoreResult<Option<Book>> {
        BookRepo::find_by_id(&self.pool, id).await.map_err(classify)
    }

    async fn create(&self, draft: CreateBook) -> StoreResult<Book> {
        BookRepo::create(&self.pool, &draft).await.map_err(classify)
    }

    async fn update(&self, id: DbId, changes: UpdateBook) -> StoreResult<Option<Book>> {
        BookRepo::update(&self.pool, id, &changes).await.map_err(classify)
    }

    async fn delete(&self, id: DbId) -> StoreResult<bool> {
        BookRepo::delete(&self.pool, id).await.map_err(classify)
    }
}

#[async_trait]
impl Repository<Library> for PgStore {
    async fn list(&self, _scope: Scope) -> StoreResult<Vec<Library>> {
        LibraryRepo::list(&self.pool).await.map_err(classify)
    }

    async fn find(&self, id: DbId) -> StoreResult<Option<Library>> {
        LibraryRepo::find_by_id(&self.pool, id).await.map_err(classify)
    }

    async fn create(&self, draft: CreateLibrary) -> StoreResult<Library> {
        LibraryRepo::create(&self.pool, &draft).await.map_err(classify)
    }

    async fn update(&self, id: DbId, changes: UpdateLibrary) -> StoreResult<Option<Library>> {
        LibraryRepo::update(&self.pool, id, &changes).await.map_err(classify)
    }

    async fn delete(&self, id: DbId) -> StoreResult<bool> {
        LibraryRepo::delete(&self.pool, id).await.map_err(classify)
    }
}

#[async_trait]
impl Repository<Post> for PgStore {
    async fn list(&self, _scope: Scope) -> StoreResult<Vec<Post>> {
        PostRepo::list(&self.pool).await.map_err(classify)
    }

    async fn find(&self, id: DbId) -> StoreResult<Option<Post>> {
        PostRepo::find_by_id(&self.pool, id).await.map_err(classify)
    }

    async fn create(&self, draft: CreatePost) -> StoreResult<Post> {
        PostRepo::create(&self.pool, &draft).await.map_err(classify)
    }

    async fn update(&self, id: DbId, changes: UpdatePost) -> StoreResult<Option<Post>> {
        PostRepo::update(&self.pool, id, &changes).await.map_err(classify)
    }

    async fn delete(&self, id: DbId) -> StoreResult<bool> {
        PostRepo::delete(&self.pool, id).await.map_err(classify)
    }
}

#[async_trait]
impl Repository<Comment> for PgStore {
    async fn list(&self, scope: Scope) -> StoreResult<Vec<Comment>> {
        let comments = match scope {
            Scope::All => CommentRepo::list(&self.pool).await,
            Scope::Parent(post_id) => CommentRepo::list_by_post(&self.pool, post_id).await,
        };
        comments.map_err(classify)
    }

    async fn find(&self, id: DbId) -> StoreResult<Option<Comment>> {
        CommentRepo::find_by_id(&self.pool, id).await.map_err(classify)
    }

    async fn create(&self, draft: CreateComment) -> StoreResult<Comment> {
        CommentRepo::create(&self.pool, &draft).await.map_err(classify)
    }

    async fn update(&self, id: DbId, changes: UpdateComment) -> StoreResult<Option<Comment>> {
        CommentRepo::update(&self.pool, id, &changes).await.map_err(classify)
    }

    async fn delete(&self, id: DbId) -> StoreResult<bool> {
        CommentRepo::delete(&self.pool, id).await.map_err(classify)
    }
}

#[async_trait]
impl Repository<Article> for PgStore {
    async fn list(&self, _scope: Scope) -> StoreResult<Vec<Article>> {
        ArticleRepo::list(&self.pool).await.map_err(classify)
    }

    async fn find(&self, id: DbId) -> StoreResult<Option<Article>> {
        ArticleRepo::find_by_id(&self.pool, id).await.map_err(classify)
    }

    async fn create(&self, draft: CreateArticle) -> StoreResult<Article> {
        ArticleRepo::create(&self.pool, &draft).await.map_err(classify)
    }

    async fn update(&self, id: DbId, changes: UpdateArticle) -> StoreResult<Option<Article>> {
        ArticleRepo::update(&self.pool, id, &changes).await.map_err(classify)
    }

    async fn delete(&self, id: DbId) -> StoreResult<bool> {
        ArticleRepo::delete(&self.pool, id).await.map_err(classify)
    }
}

#[async_trait]
impl Directory for PgStore {
    async fn create_user(&self, input: CreateUser) -> StoreResult<User> {
        UserRepo::create(&self.pool, &input).await.map_err(classify)
    }

    async fn find_user(&self, id: DbId) -> StoreResult<Option<User>> {
        UserRepo::find_by_id(&self.pool, id).await.map_err(classify)
    }

    async fn follow(&self, follower: DbId, followee: DbId) -> StoreResult<bool> {
        UserRepo::follow(&self.pool, follower, followee).await.map_err(classify)
    }

    async fn unfollow(&self, follower: DbId, followee: DbId) -> StoreResult<bool> {
        UserRepo::unfollow(&self.pool, follower, followee).await.map_err(classify)
    }

    async fn following(&self, follower: DbId) -> StoreResult<Vec<DbId>> {
        UserRepo::following(&self.pool, follower).await.map_err(classify)
    }

    async fn feed(&self, follower: DbId) -> StoreResult<Vec<Post>> {
        PostRepo::list_followed(&self.pool, follower).await.map_err(classify)
    }
}

#[async_trait]
impl Shelves for PgStore {
    async fn shelve(&self, library_id: DbId, book_id: DbId) -> StoreResult<bool> {
        LibraryRepo::add_book(&self.pool, library_id, book_id).await.map_err(classify)
    }

    async fn unshelve(&self, library_id: DbId, book_id: DbId) -> StoreResult<bool> {
        LibraryRepo::remove_book(&self.pool, library_id, book_id).await.map_err(classify)
    }

    async fn shelved_books(&self, library_id: DbId) -> StoreResult<Vec<Book>> {
        BookRepo::list_by_library(&self.pool, library_id).await.map_err(classify)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        crate::health_check(&self.pool).await.map_err(classify)
    }

    async fn summary(&self) -> StoreResult<Summary> {
        SummaryRepo::counts(&self.pool).await.map_err(classify)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn key_value_extracts_referenced_id() {
        assert_eq!(
            key_value("Key (author_id)=(99) is not present in table \"authors\"."),
            Some("99")
        );
        assert_eq!(key_value("no key here"), None);
    }

    #[test]
    fn pool_timeout_is_unavailable() {
        assert_matches!(classify(sqlx::Error::PoolTimedOut), StoreError::Unavailable(_));
    }

    #[test]
    fn row_not_found_stays_database_error() {
        assert_matches!(classify(sqlx::Error::RowNotFound), StoreError::Database(_));
    }
}
