//! The storage contract the gateway is written against.
//!
//! [`PgStore`](crate::PgStore) and [`MemoryStore`](crate::MemoryStore) both
//! implement [`Store`]. Referential and uniqueness rules are enforced by the
//! store and reported as [`StoreError::Integrity`] so callers can surface
//! them as field errors.

use async_trait::async_trait;
use folio_core::resource::Resource;
use folio_core::types::DbId;

use crate::models::article::Article;
use crate::models::author::Author;
use crate::models::book::Book;
use crate::models::comment::Comment;
use crate::models::library::Library;
use crate::models::post::Post;
use crate::models::summary::Summary;
use crate::models::user::{CreateUser, User};

pub const MSG_NO_SUCH_OBJECT: &str = "object does not exist.";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A write violated a referential or uniqueness rule.
    #[error("{field}: {message}")]
    Integrity { field: String, message: String },

    /// The backing store cannot be reached right now.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub fn integrity(field: impl Into<String>, message: impl Into<String>) -> Self {
        StoreError::Integrity {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Reference to a row that does not exist.
    pub fn missing_reference(field: impl Into<String>, id: impl std::fmt::Display) -> Self {
        Self::integrity(field, format!("Invalid pk \"{id}\" - {MSG_NO_SUCH_OBJECT}"))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Which rows a list covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    /// Rows nested under the given parent, e.g. comments of one post.
    Parent(DbId),
}

impl Scope {
    pub fn parent(self) -> Option<DbId> {
        match self {
            Scope::All => None,
            Scope::Parent(id) => Some(id),
        }
    }

    /// Whether an entity with the given parent belongs to this scope.
    pub fn admits(self, parent: Option<DbId>) -> bool {
        match self {
            Scope::All => true,
            Scope::Parent(id) => parent == Some(id),
        }
    }
}

/// CRUD access to one entity type.
#[async_trait]
pub trait Repository<E: Resource>: Send + Sync {
    async fn list(&self, scope: Scope) -> StoreResult<Vec<E>>;

    async fn find(&self, id: DbId) -> StoreResult<Option<E>>;

    async fn create(&self, draft: E::Draft) -> StoreResult<E>;

    /// Apply `changes`. Returns `None` if no row with `id` exists.
    async fn update(&self, id: DbId, changes: E::Changes) -> StoreResult<Option<E>>;

    /// Returns `true` if a row was removed.
    async fn delete(&self, id: DbId) -> StoreResult<bool>;
}

/// Users and the follow graph.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn create_user(&self, input: CreateUser) -> StoreResult<User>;

    async fn find_user(&self, id: DbId) -> StoreResult<Option<User>>;

    /// Returns `true` if the edge was newly created.
    async fn follow(&self, follower: DbId, followee: DbId) -> StoreResult<bool>;

    /// Returns `true` if an edge was removed.
    async fn unfollow(&self, follower: DbId, followee: DbId) -> StoreResult<bool>;

    async fn following(&self, follower: DbId) -> StoreResult<Vec<DbId>>;

    /// Posts by users `follower` follows, newest first.
    async fn feed(&self, follower: DbId) -> StoreResult<Vec<Post>>;
}

/// Library membership of books.
#[async_trait]
pub trait Shelves: Send + Sync {
    /// Returns `true` if the book was not already on the shelf.
    async fn shelve(&self, library_id: DbId, book_id: DbId) -> StoreResult<bool>;

    /// Returns `true` if the book was on the shelf.
    async fn unshelve(&self, library_id: DbId, book_id: DbId) -> StoreResult<bool>;

    /// Books held by a library, ordered by title.
    async fn shelved_books(&self, library_id: DbId) -> StoreResult<Vec<Book>>;
}

/// Everything the gateway needs from persistence.
#[async_trait]
pub trait Store:
    Repository<Author>
    + Repository<Book>
    + Repository<Library>
    + Repository<Post>
    + Repository<Comment>
    + Repository<Article>
    + Directory
    + Shelves
{
    /// Cheap reachability probe for health checks.
    async fn ping(&self) -> StoreResult<()>;

    async fn summary(&self) -> StoreResult<Summary>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_admits_matching_parent_only() {
        assert!(Scope::All.admits(None));
        assert!(Scope::All.admits(Some(3)));
        assert!(Scope::Parent(3).admits(Some(3)));
        assert!(!Scope::Parent(3).admits(Some(4)));
        assert!(!Scope::Parent(3).admits(None));
    }

    #[test]
    fn missing_reference_message() {
        let err = StoreError::missing_reference("author", 99);
        match err {
            StoreError::Integrity { field, message } => {
                assert_eq!(field, "author");
                assert_eq!(message, "Invalid pk \"99\" - object does not exist.");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
