use axum::routing::get;
use axum::Router;

use crate::handlers::articles;
use crate::state::AppState;

/// Routes mounted at `/articles`.
///
/// ```text
/// GET    /                -> list
/// POST   /                -> create
/// GET    /{id}            -> get_by_id
/// PUT    /{id}            -> update
/// PATCH  /{id}            -> partial_update
/// DELETE /{id}            -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(articles::list).post(articles::create))
        .route(
            "/{id}",
            get(articles::get_by_id)
                .put(articles::update)
                .patch(articles::partial_update)
                .delete(articles::delete),
        )
}
