//! Handlers for the `/posts` resource.
//!
//! The author of a new post is the caller; only the author may change or
//! delete it.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use folio_core::actor::Actor;
use folio_core::shaping::ListQuery;
use folio_core::types::DbId;
use folio_core::validation::WriteMode;
use folio_db::models::post::Post;
use folio_db::Scope;
use serde_json::Value;

use crate::error::AppResult;
use crate::state::AppState;

/// GET /api/v1/posts
pub async fn list(
    State(state): State<AppState>,
    actor: Actor,
    Query(params): Query<Vec<(String, String)>>,
) -> AppResult<Json<Vec<Post>>> {
    let query = ListQuery::from_pairs(params);
    let items = state.gateway(&actor).list(Scope::All, &query).await?;
    Ok(Json(items))
}

/// POST /api/v1/posts
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<Value>,
) -> AppResult<(StatusCode, Json<Post>)> {
    let created = state.gateway(&actor).create(Scope::All, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/v1/posts/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DbId>,
) -> AppResult<Json<Post>> {
    let item = state.gateway(&actor).retrieve(Scope::All, id).await?;
    Ok(Json(item))
}

/// PUT /api/v1/posts/{id}
pub async fn update(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DbId>,
    Json(payload): Json<Value>,
) -> AppResult<Json<Post>> {
    let item = state
        .gateway(&actor)
        .update(Scope::All, id, payload, WriteMode::Replace)
        .await?;
    Ok(Json(item))
}

/// PATCH /api/v1/posts/{id}
pub async fn partial_update(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DbId>,
    Json(payload): Json<Value>,
) -> AppResult<Json<Post>> {
    let item = state
        .gateway(&actor)
        .update(Scope::All, id, payload, WriteMode::Partial)
        .await?;
    Ok(Json(item))
}

/// DELETE /api/v1/posts/{id}
pub async fn delete(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.gateway(&actor).delete::<Post>(Scope::All, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
