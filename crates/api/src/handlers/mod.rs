pub mod articles;
pub mod authors;
pub mod books;
pub mod comments;
pub mod dashboards;
pub mod health;
pub mod libraries;
pub mod posts;
pub mod social;
