//! Aggregate counts shown on role dashboards.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub authors: i64,
    pub books: i64,
    pub libraries: i64,
    pub posts: i64,
    pub users: i64,
}
