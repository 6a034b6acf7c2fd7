//! Route definitions for the `/books` resource.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::books;
use crate::state::AppState;

/// Routes mounted at `/books`.
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
        .route("/", get(books::list).post(books::create))
        .route("/create", post(books::create))
        .route(
            "/{id}",
            get(books::get_by_id)
                .put(books::update)
                .patch(books::partial_update)
                .delete(books::delete),
        )
        .route("/{id}/update", put(books::update).patch(books::partial_update))
        .route("/{id}/delete", delete(books::delete))
}
