use axum::routing::get;
use axum::Router;

use crate::handlers::dashboards;
use crate::state::AppState;

/// Routes mounted at `/dashboards`.
///
/// ```text
/// GET    /admin       -> admin      (admin role)
/// GET    /librarian   -> librarian  (librarian role)
/// GET    /member      -> member     (member role)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin", get(dashboards::admin))
        .route("/librarian", get(dashboards::librarian))
        .route("/member", get(dashboards::member))
}
