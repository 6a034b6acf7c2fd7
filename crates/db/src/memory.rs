//! In-process [`Store`] backed by ordered maps behind a `tokio` lock.
//!
//! Enforces the same referential, uniqueness and cascade rules as the
//! PostgreSQL schema so the gateway behaves identically on either backend.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use folio_core::error::FieldErrors;
use folio_core::types::DbId;
use tokio::sync::RwLock;

use crate::models::article::{Article, CreateArticle, UpdateArticle};
use crate::models::author::{Author, CreateAuthor, UpdateAuthor};
use crate::models::book::{Book, CreateBook, UpdateBook};
use crate::models::comment::{Comment, CreateComment, UpdateComment};
use crate::models::library::{CreateLibrary, Library, UpdateLibrary};
use crate::models::post::{CreatePost, Post, UpdatePost};
use crate::models::summary::Summary;
use crate::models::user::{CreateUser, User};
use crate::store::{Directory, Repository, Scope, Shelves, Store, StoreError, StoreResult};

pub const MSG_BOOK_NOT_UNIQUE: &str = "The fields title, author must make a unique set.";
pub const MSG_LIBRARY_NAME_TAKEN: &str = "library with this name already exists.";
pub const MSG_USERNAME_TAKEN: &str = "A user with that username already exists.";

#[derive(Debug, Default)]
struct Seq(DbId);

impl Seq {
    fn next(&mut self) -> DbId {
        self.0 += 1;
        self.0
    }
}

#[derive(Debug, Clone)]
struct BookRow {
    title: String,
    publication_year: i32,
    author_id: DbId,
}

#[derive(Debug, Default)]
struct Tables {
    author_ids: Seq,
    book_ids: Seq,
    library_ids: Seq,
    user_ids: Seq,
    post_ids: Seq,
    comment_ids: Seq,
    article_ids: Seq,

    authors: BTreeMap<DbId, String>,
    books: BTreeMap<DbId, BookRow>,
    libraries: BTreeMap<DbId, String>,
    /// `(library_id, book_id)`
    shelves: BTreeSet<(DbId, DbId)>,
    users: BTreeMap<DbId, User>,
    /// `(follower_id, followee_id)`
    follows: BTreeSet<(DbId, DbId)>,
    posts: BTreeMap<DbId, Post>,
    comments: BTreeMap<DbId, Comment>,
    articles: BTreeMap<DbId, Article>,
}

impl Tables {
    fn book(&self, id: DbId) -> Option<Book> {
        let row = self.books.get(&id)?;
        Some(Book {
            id,
            title: row.title.clone(),
            publication_year: row.publication_year,
            author_id: row.author_id,
            author_name: self.authors.get(&row.author_id).cloned().unwrap_or_default(),
        })
    }

    fn author(&self, id: DbId) -> Option<Author> {
        let name = self.authors.get(&id)?;
        let books = self
            .books
            .iter()
            .filter(|(_, row)| row.author_id == id)
            .filter_map(|(book_id, _)| self.book(*book_id))
            .collect();
        Some(Author {
            id,
            name: name.clone(),
            books,
        })
    }

    fn library(&self, id: DbId) -> Option<Library> {
        let name = self.libraries.get(&id)?;
        Some(Library {
            id,
            name: name.clone(),
            books: self.shelved(id).collect(),
        })
    }

    fn shelved(&self, library_id: DbId) -> impl Iterator<Item = DbId> + '_ {
        self.shelves
            .range((library_id, DbId::MIN)..=(library_id, DbId::MAX))
            .map(|(_, book_id)| *book_id)
    }

    fn check_author_exists(&self, author_id: DbId) -> StoreResult<()> {
        if self.authors.contains_key(&author_id) {
            Ok(())
        } else {
            Err(StoreError::missing_reference("author", author_id))
        }
    }

    fn check_book_unique(
        &self,
        title: &str,
        author_id: DbId,
        except: Option<DbId>,
    ) -> StoreResult<()> {
        let taken = self.books.iter().any(|(id, row)| {
            Some(*id) != except && row.title == title && row.author_id == author_id
        });
        if taken {
            Err(StoreError::integrity(FieldErrors::NON_FIELD, MSG_BOOK_NOT_UNIQUE))
        } else {
            Ok(())
        }
    }

    fn check_library_unique(&self, name: &str, except: Option<DbId>) -> StoreResult<()> {
        let taken = self
            .libraries
            .iter()
            .any(|(id, existing)| Some(*id) != except && existing == name);
        if taken {
            Err(StoreError::integrity("name", MSG_LIBRARY_NAME_TAKEN))
        } else {
            Ok(())
        }
    }

    fn check_user_exists(&self, field: &str, user_id: DbId) -> StoreResult<()> {
        if self.users.contains_key(&user_id) {
            Ok(())
        } else {
            Err(StoreError::missing_reference(field, user_id))
        }
    }

    fn remove_book(&mut self, id: DbId) -> bool {
        self.shelves.retain(|(_, book_id)| *book_id != id);
        self.books.remove(&id).is_some()
    }

    fn remove_post(&mut self, id: DbId) -> bool {
        self.comments.retain(|_, comment| comment.post_id != id);
        self.posts.remove(&id).is_some()
    }
}

/// Store that keeps everything in memory. Cloning is not supported; share it
/// behind an `Arc`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail with [`StoreError::Unavailable`] until
    /// switched back. Used to exercise outage handling.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("memory store is offline".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Repository<Author> for MemoryStore {
    async fn list(&self, _scope: Scope) -> StoreResult<Vec<Author>> {
        self.ensure_online()?;
        let t = self.tables.read().await;
        Ok(t.authors.keys().filter_map(|id| t.author(*id)).collect())
    }

    async fn find(&self, id: DbId) -> StoreResult<Option<Author>> {
        self.ensure_online()?;
        Ok(self.tables.read().await.author(id))
    }

    async fn create(&self, draft: CreateAuthor) -> StoreResult<Author> {
        self.ensure_online()?;
        let mut t = self.tables.write().await;
        let id = t.author_ids.next();
        t.authors.insert(id, draft.name);
        t.author(id).ok_or_else(|| StoreError::Unavailable("author vanished".into()))
    }

    async fn update(&self, id: DbId, changes: UpdateAuthor) -> StoreResult<Option<Author>> {
        self.ensure_online()?;
        let mut t = self.tables.write().await;
        let Some(name) = t.authors.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(new_name) = changes.name {
            *name = new_name;
        }
        Ok(t.author(id))
    }

    async fn delete(&self, id: DbId) -> StoreResult<bool> {
        self.ensure_online()?;
        let mut t = self.tables.write().await;
        if t.authors.remove(&id).is_none() {
            return Ok(false);
        }
        let orphaned: Vec<DbId> = t
            .books
            .iter()
            .filter(|(_, row)| row.author_id == id)
            .map(|(book_id, _)| *book_id)
            .collect();
        for book_id in orphaned {
            t.remove_book(book_id);
        }
        Ok(true)
    }
}

#[async_trait]
impl Repository<Book> for MemoryStore {
    async fn list(&self, _scope: Scope) -> StoreResult<Vec<Book>> {
        self.ensure_online()?;
        let t = self.tables.read().await;
        Ok(t.books.keys().filter_map(|id| t.book(*id)).collect())
    }

    async fn find(&self, id: DbId) -> StoreResult<Option<Book>> {
        self.ensure_online()?;
        Ok(self.tables.read().await.book(id))
    }

    async fn create(&self, draft: CreateBook) -> StoreResult<Book> {
        self.ensure_online()?;
        let mut t = self.tables.write().await;
        t.check_author_exists(draft.author_id)?;
        t.check_book_unique(&draft.title, draft.author_id, None)?;
        let id = t.book_ids.next();
        t.books.insert(
            id,
            BookRow {
                title: draft.title,
                publication_year: draft.publication_year,
                author_id: draft.author_id,
            },
        );
        t.book(id).ok_or_else(|| StoreError::Unavailable("book vanished".into()))
    }

    async fn update(&self, id: DbId, changes: UpdateBook) -> StoreResult<Option<Book>> {
        self.ensure_online()?;
        let mut t = self.tables.write().await;
        let Some(current) = t.books.get(&id).cloned() else {
            return Ok(None);
        };
        let next = BookRow {
            title: changes.title.unwrap_or(current.title),
            publication_year: changes.publication_year.unwrap_or(current.publication_year),
            author_id: changes.author_id.unwrap_or(current.author_id),
        };
        t.check_author_exists(next.author_id)?;
        t.check_book_unique(&next.title, next.author_id, Some(id))?;
        t.books.insert(id, next);
        Ok(t.book(id))
    }

    async fn delete(&self, id: DbId) -> StoreResult<bool> {
        self.ensure_online()?;
        Ok(self.tables.write().await.remove_book(id))
    }
}

#[async_trait]
impl Repository<Library> for MemoryStore {
    async fn list(&self, _scope: Scope) -> StoreResult<Vec<Library>> {
        self.ensure_online()?;
        let t = self.tables.read().await;
        Ok(t.libraries.keys().filter_map(|id| t.library(*id)).collect())
    }

    async fn find(&self, id: DbId) -> StoreResult<Option<Library>> {
        self.ensure_online()?;
        Ok(self.tables.read().await.library(id))
    }

    async fn create(&self, draft: CreateLibrary) -> StoreResult<Library> {
        self.ensure_online()?;
        let mut t = self.tables.write().await;
        t.check_library_unique(&draft.name, None)?;
        let id = t.library_ids.next();
        t.libraries.insert(id, draft.name);
        t.library(id).ok_or_else(|| StoreError::Unavailable("library vanished".into()))
    }

    async fn update(&self, id: DbId, changes: UpdateLibrary) -> StoreResult<Option<Library>> {
        self.ensure_online()?;
        let mut t = self.tables.write().await;
        if !t.libraries.contains_key(&id) {
            return Ok(None);
        }
        if let Some(name) = changes.name {
            t.check_library_unique(&name, Some(id))?;
            t.libraries.insert(id, name);
        }
        Ok(t.library(id))
    }

    async fn delete(&self, id: DbId) -> StoreResult<bool> {
        self.ensure_online()?;
        let mut t = self.tables.write().await;
        t.shelves.retain(|(library_id, _)| *library_id != id);
        Ok(t.libraries.remove(&id).is_some())
    }
}

#[async_trait]
impl Repository<Post> for MemoryStore {
    async fn list(&self, _scope: Scope) -> StoreResult<Vec<Post>> {
        self.ensure_online()?;
        Ok(self.tables.read().await.posts.values().cloned().collect())
    }

    async fn find(&self, id: DbId) -> StoreResult<Option<Post>> {
        self.ensure_online()?;
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn create(&self, draft: CreatePost) -> StoreResult<Post> {
        self.ensure_online()?;
        let mut t = self.tables.write().await;
        t.check_user_exists("author", draft.author_id)?;
        let now = Utc::now();
        let post = Post {
            id: t.post_ids.next(),
            title: draft.title,
            content: draft.content,
            author_id: draft.author_id,
            created_at: now,
            updated_at: now,
        };
        t.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, id: DbId, changes: UpdatePost) -> StoreResult<Option<Post>> {
        self.ensure_online()?;
        let mut t = self.tables.write().await;
        let Some(post) = t.posts.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            post.title = title;
        }
        if let Some(content) = changes.content {
            post.content = content;
        }
        post.updated_at = Utc::now();
        Ok(Some(post.clone()))
    }

    async fn delete(&self, id: DbId) -> StoreResult<bool> {
        self.ensure_online()?;
        Ok(self.tables.write().await.remove_post(id))
    }
}

#[async_trait]
impl Repository<Comment> for MemoryStore {
    async fn list(&self, scope: Scope) -> StoreResult<Vec<Comment>> {
        self.ensure_online()?;
        let t = self.tables.read().await;
        Ok(t.comments
            .values()
            .filter(|c| scope.admits(Some(c.post_id)))
            .cloned()
            .collect())
    }

    async fn find(&self, id: DbId) -> StoreResult<Option<Comment>> {
        self.ensure_online()?;
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn create(&self, draft: CreateComment) -> StoreResult<Comment> {
        self.ensure_online()?;
        let mut t = self.tables.write().await;
        if !t.posts.contains_key(&draft.post_id) {
            return Err(StoreError::missing_reference("post", draft.post_id));
        }
        t.check_user_exists("author", draft.author_id)?;
        let now = Utc::now();
        let comment = Comment {
            id: t.comment_ids.next(),
            post_id: draft.post_id,
            author_id: draft.author_id,
            content: draft.content,
            created_at: now,
            updated_at: now,
        };
        t.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn update(&self, id: DbId, changes: UpdateComment) -> StoreResult<Option<Comment>> {
        self.ensure_online()?;
        let mut t = self.tables.write().await;
        let Some(comment) = t.comments.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(content) = changes.content {
            comment.content = content;
        }
        comment.updated_at = Utc::now();
        Ok(Some(comment.clone()))
    }

    async fn delete(&self, id: DbId) -> StoreResult<bool> {
        self.ensure_online()?;
        Ok(self.tables.write().await.comments.remove(&id).is_some())
    }
}

#[async_trait]
impl Repository<Article> for MemoryStore {
    async fn list(&self, _scope: Scope) -> StoreResult<Vec<Article>> {
        self.ensure_online()?;
        Ok(self.tables.read().await.articles.values().cloned().collect())
    }

    async fn find(&self, id: DbId) -> StoreResult<Option<Article>> {
        self.ensure_online()?;
        Ok(self.tables.read().await.articles.get(&id).cloned())
    }

    async fn create(&self, draft: CreateArticle) -> StoreResult<Article> {
        self.ensure_online()?;
        let mut t = self.tables.write().await;
        t.check_user_exists("author", draft.author_id)?;
        let article = Article {
            id: t.article_ids.next(),
            title: draft.title,
            content: draft.content,
            author_id: draft.author_id,
            created_at: Utc::now(),
        };
        t.articles.insert(article.id, article.clone());
        Ok(article)
    }

    async fn update(&self, id: DbId, changes: UpdateArticle) -> StoreResult<Option<Article>> {
        self.ensure_online()?;
        let mut t = self.tables.write().await;
        let Some(article) = t.articles.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            article.title = title;
        }
        if let Some(content) = changes.content {
            article.content = content;
        }
        Ok(Some(article.clone()))
    }

    async fn delete(&self, id: DbId) -> StoreResult<bool> {
        self.ensure_online()?;
        Ok(self.tables.write().await.articles.remove(&id).is_some())
    }
}

#[async_trait]
impl Directory for MemoryStore {
    async fn create_user(&self, input: CreateUser) -> StoreResult<User> {
        self.ensure_online()?;
        let mut t = self.tables.write().await;
        if t.users.values().any(|u| u.username == input.username) {
            return Err(StoreError::integrity("username", MSG_USERNAME_TAKEN));
        }
        let user = User {
            id: t.user_ids.next(),
            username: input.username,
            role: input.role.map(|r| r.as_str().to_string()),
            is_superuser: input.is_superuser,
            capabilities: input.capabilities,
            created_at: Utc::now(),
        };
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: DbId) -> StoreResult<Option<User>> {
        self.ensure_online()?;
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn follow(&self, follower: DbId, followee: DbId) -> StoreResult<bool> {
        self.ensure_online()?;
        let mut t = self.tables.write().await;
        t.check_user_exists("follower", follower)?;
        t.check_user_exists("followee", followee)?;
        Ok(t.follows.insert((follower, followee)))
    }

    async fn unfollow(&self, follower: DbId, followee: DbId) -> StoreResult<bool> {
        self.ensure_online()?;
        Ok(self.tables.write().await.follows.remove(&(follower, followee)))
    }

    async fn following(&self, follower: DbId) -> StoreResult<Vec<DbId>> {
        self.ensure_online()?;
        let t = self.tables.read().await;
        Ok(t.follows
            .range((follower, DbId::MIN)..=(follower, DbId::MAX))
            .map(|(_, followee)| *followee)
            .collect())
    }

    async fn feed(&self, follower: DbId) -> StoreResult<Vec<Post>> {
        self.ensure_online()?;
        let t = self.tables.read().await;
        let mut posts: Vec<Post> = t
            .posts
            .values()
            .filter(|p| t.follows.contains(&(follower, p.author_id)))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(posts)
    }
}

#[async_trait]
impl Shelves for MemoryStore {
    async fn shelve(&self, library_id: DbId, book_id: DbId) -> StoreResult<bool> {
        self.ensure_online()?;
        let mut t = self.tables.write().await;
        if !t.libraries.contains_key(&library_id) {
            return Err(StoreError::missing_reference("library", library_id));
        }
        if !t.books.contains_key(&book_id) {
            return Err(StoreError::missing_reference("book", book_id));
        }
        Ok(t.shelves.insert((library_id, book_id)))
    }

    async fn unshelve(&self, library_id: DbId, book_id: DbId) -> StoreResult<bool> {
        self.ensure_online()?;
        Ok(self.tables.write().await.shelves.remove(&(library_id, book_id)))
    }

    async fn shelved_books(&self, library_id: DbId) -> StoreResult<Vec<Book>> {
        self.ensure_online()?;
        let t = self.tables.read().await;
        let mut books: Vec<Book> = t.shelved(library_id).filter_map(|id| t.book(id)).collect();
        books.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(books)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        self.ensure_online()
    }

    async fn summary(&self) -> StoreResult<Summary> {
        self.ensure_online()?;
        let t = self.tables.read().await;
        let count = |n: usize| i64::try_from(n).unwrap_or(i64::MAX);
        Ok(Summary {
            authors: count(t.authors.len()),
            books: count(t.books.len()),
            libraries: count(t.libraries.len()),
            posts: count(t.posts.len()),
            users: count(t.users.len()),
        })
    }
}
