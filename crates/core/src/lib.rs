//! Domain core for the Folio resource gateway.
//!
//! Pure logic only (no HTTP, no database): validation schemas, the permission
//! evaluator, query shaping and the shared error type. Both the store
//! adapters in `folio-db` and the HTTP layer in `folio-api` build on it.

pub mod actor;
pub mod error;
pub mod permissions;
pub mod resource;
pub mod roles;
pub mod shaping;
pub mod types;
pub mod validation;
