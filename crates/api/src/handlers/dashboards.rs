//! Role dashboards. Each is visible only to holders of its role.

use axum::extract::State;
use axum::Json;
use folio_core::actor::Actor;
use folio_core::permissions::Action;
use folio_core::roles::Role;
use folio_db::models::summary::Summary;
use folio_db::Store;
use serde::Serialize;

use crate::error::AppResult;
use crate::policies::dashboard_kind;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub role: Role,
    pub username: String,
    pub summary: Summary,
}

/// GET /api/v1/dashboards/admin
pub async fn admin(
    State(state): State<AppState>,
    actor: Actor,
) -> AppResult<Json<DataResponse<Dashboard>>> {
    render(&state, &actor, Role::Admin).await
}

/// GET /api/v1/dashboards/librarian
pub async fn librarian(
    State(state): State<AppState>,
    actor: Actor,
) -> AppResult<Json<DataResponse<Dashboard>>> {
    render(&state, &actor, Role::Librarian).await
}

/// GET /api/v1/dashboards/member
pub async fn member(
    State(state): State<AppState>,
    actor: Actor,
) -> AppResult<Json<DataResponse<Dashboard>>> {
    render(&state, &actor, Role::Member).await
}

async fn render(
    state: &AppState,
    actor: &Actor,
    role: Role,
) -> AppResult<Json<DataResponse<Dashboard>>> {
    state
        .gateway(actor)
        .authorize_kind(Action::Retrieve, dashboard_kind(role), None)?;
    let summary = state.store.summary().await?;
    let username = actor
        .principal()
        .map(|p| p.username.clone())
        .unwrap_or_default();

    Ok(Json(DataResponse {
        data: Dashboard {
            role,
            username,
            summary,
        },
    }))
}
