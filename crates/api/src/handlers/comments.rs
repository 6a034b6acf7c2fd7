//! Handlers for comments nested under `/posts/{post_id}/comments`.
//!
//! The post must exist (404 otherwise) and a comment id that belongs to a
//! different post is treated as not found.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use folio_core::actor::Actor;
use folio_core::permissions::Action;
use folio_core::shaping::ListQuery;
use folio_core::types::DbId;
use folio_core::validation::WriteMode;
use folio_db::models::comment::Comment;
use folio_db::models::post::Post;
use folio_db::{Scope, Store};
use serde_json::Value;

use crate::error::AppResult;
use crate::gateway::Gateway;
use crate::state::AppState;

/// Authorize `action` on comments, then resolve the enclosing post.
async fn post_scope(
    gateway: &Gateway<'_, dyn Store>,
    action: Action,
    post_id: DbId,
) -> AppResult<Scope> {
    gateway.authorize::<Comment>(action, None)?;
    let post: Post = gateway.fetch(post_id).await?;
    Ok(Scope::Parent(post.id))
}

/// GET /api/v1/posts/{post_id}/comments
pub async fn list(
    State(state): State<AppState>,
    actor: Actor,
    Path(post_id): Path<DbId>,
    Query(params): Query<Vec<(String, String)>>,
) -> AppResult<Json<Vec<Comment>>> {
    let gateway = state.gateway(&actor);
    let scope = post_scope(&gateway, Action::List, post_id).await?;
    let comments = gateway.list(scope, &ListQuery::from_pairs(params)).await?;
    Ok(Json(comments))
}

/// POST /api/v1/posts/{post_id}/comments
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    Path(post_id): Path<DbId>,
    Json(payload): Json<Value>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    let gateway = state.gateway(&actor);
    let scope = post_scope(&gateway, Action::Create, post_id).await?;
    let comment = gateway.create(scope, payload).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// GET /api/v1/posts/{post_id}/comments/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    actor: Actor,
    Path((post_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<Comment>> {
    let gateway = state.gateway(&actor);
    let scope = post_scope(&gateway, Action::Retrieve, post_id).await?;
    Ok(Json(gateway.retrieve(scope, id).await?))
}

/// PUT /api/v1/posts/{post_id}/comments/{id}
pub async fn update(
    State(state): State<AppState>,
    actor: Actor,
    Path((post_id, id)): Path<(DbId, DbId)>,
    Json(payload): Json<Value>,
) -> AppResult<Json<Comment>> {
    let gateway = state.gateway(&actor);
    let scope = post_scope(&gateway, Action::Update, post_id).await?;
    let comment = gateway.update(scope, id, payload, WriteMode::Replace).await?;
    Ok(Json(comment))
}

/// PATCH /api/v1/posts/{post_id}/comments/{id}
pub async fn partial_update(
    State(state): State<AppState>,
    actor: Actor,
    Path((post_id, id)): Path<(DbId, DbId)>,
    Json(payload): Json<Value>,
) -> AppResult<Json<Comment>> {
    let gateway = state.gateway(&actor);
    let scope = post_scope(&gateway, Action::PartialUpdate, post_id).await?;
    let comment = gateway.update(scope, id, payload, WriteMode::Partial).await?;
    Ok(Json(comment))
}

/// DELETE /api/v1/posts/{post_id}/comments/{id}
pub async fn delete(
    State(state): State<AppState>,
    actor: Actor,
    Path((post_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let gateway = state.gateway(&actor);
    let scope = post_scope(&gateway, Action::Delete, post_id).await?;
    gateway.delete::<Comment>(scope, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
