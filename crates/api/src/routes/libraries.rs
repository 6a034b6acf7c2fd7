//! Route definitions for the `/libraries` resource and its shelves.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::libraries;
use crate::state::AppState;

/// Routes mounted at `/libraries`.
///
/// ```text
/// GET    /                        -> list
/// POST   /                        -> create
/// GET    /{id}                    -> get_by_id
/// PUT    /{id}                    -> update
/// PATCH  /{id}                    -> partial_update
/// DELETE /{id}                    -> delete
///
/// GET    /{id}/books              -> list_books
/// POST   /{id}/books/{book_id}    -> shelve
/// DELETE /{id}/books/{book_id}    -> unshelve
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(libraries::list).post(libraries::create))
        .route(
            "/{id}",
            get(libraries::get_by_id)
                .put(libraries::update)
                .patch(libraries::partial_update)
                .delete(libraries::delete),
        )
        .route("/{id}/books", get(libraries::list_books))
        .route(
            "/{id}/books/{book_id}",
            post(libraries::shelve).delete(libraries::unshelve),
        )
}
