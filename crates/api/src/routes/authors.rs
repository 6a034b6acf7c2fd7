//! Route definitions for the `/authors` resource.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::authors;
use crate::state::AppState;

/// Routes mounted at `/authors`.
///
/// The `create`, `update` and `delete` suffixed paths are older aliases
/// kept for existing clients.
///
/// ```text
/// GET    /                -> list
/// POST   /                -> create
/// POST   /create          -> create
/// GET    /{id}            -> get_by_id
/// PUT    /{id}            -> update
/// PATCH  /{id}            -> partial_update
/// DELETE /{id}            -> delete
/// PUT    /{id}/update     -> update
/// PATCH  /{id}/update     -> partial_update
/// DELETE /{id}/delete     -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(authors::list).post(authors::create))
        .route("/create", post(authors::create))
        .route(
            "/{id}",
            get(authors::get_by_id)
                .put(authors::update)
                .patch(authors::partial_update)
                .delete(authors::delete),
        )
        .route("/{id}/update", put(authors::update).patch(authors::partial_update))
        .route("/{id}/delete", delete(authors::delete))
}
