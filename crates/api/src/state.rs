use std::sync::Arc;

use folio_core::actor::Actor;
use folio_core::permissions::Policies;
use folio_db::Store;

use crate::config::ServerConfig;
use crate::gateway::Gateway;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Entity store (PostgreSQL or in-memory).
    pub store: Arc<dyn Store>,
    /// Permission table consulted on every request.
    pub policies: Arc<Policies>,
    /// Server configuration (JWT settings are read by the auth extractor).
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Gateway acting on behalf of `actor` for the duration of one request.
    pub fn gateway<'a>(&'a self, actor: &'a Actor) -> Gateway<'a, dyn Store> {
        Gateway::new(self.store.as_ref(), &self.policies, actor)
    }
}
