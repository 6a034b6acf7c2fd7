use axum::routing::{get, post};
use axum::Router;

use crate::handlers::social;
use crate::state::AppState;

/// Feed and follow routes, merged at the `/api/v1` root.
///
/// ```text
/// GET    /feed                  -> feed
/// POST   /users/{id}/follow     -> follow
/// POST   /users/{id}/unfollow   -> unfollow
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/feed", get(social::feed))
        .route("/users/{id}/follow", post(social::follow))
        .route("/users/{id}/unfollow", post(social::unfollow))
}
