//! Folio API server library.
//!
//! Exposes the building blocks (config, state, gateway, error handling,
//! routes) so integration tests and the binary entrypoint share them.

pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod middleware;
pub mod policies;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
