//! Request extractors.
//!
//! - [`auth`] -- Resolves the calling [`Actor`](folio_core::actor::Actor)
//!   from the `Authorization` header.

pub mod auth;
