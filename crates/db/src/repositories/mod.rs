//! PostgreSQL repositories. One stateless struct per table family, each
//! exposing `async fn`s that take the pool explicitly.

pub mod article_repo;
pub mod author_repo;
pub mod book_repo;
pub mod comment_repo;
pub mod library_repo;
pub mod post_repo;
pub mod summary_repo;
pub mod user_repo;

pub use article_repo::ArticleRepo;
pub use author_repo::AuthorRepo;
pub use book_repo::BookRepo;
pub use comment_repo::CommentRepo;
pub use library_repo::LibraryRepo;
pub use post_repo::PostRepo;
pub use summary_repo::SummaryRepo;
pub use user_repo::UserRepo;
