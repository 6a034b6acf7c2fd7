//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches
//! - The entity's [`Resource`](folio_core::resource::Resource) declaration:
//!   its payload schema, list shape and field access

pub mod article;
pub mod author;
pub mod book;
pub mod comment;
pub mod library;
pub mod post;
pub mod summary;
pub mod user;
