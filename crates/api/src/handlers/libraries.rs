//! Handlers for the `/libraries` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use folio_core::actor::Actor;
use folio_core::shaping::ListQuery;
use folio_core::types::DbId;
use folio_core::validation::WriteMode;
use folio_db::models::book::Book;
use folio_db::models::library::Library;
use folio_db::{Scope, Shelves};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::policies::{SHELVE, UNSHELVE};
use crate::state::AppState;

/// GET /api/v1/libraries
pub async fn list(
    State(state): State<AppState>,
    actor: Actor,
    Query(params): Query<Vec<(String, String)>>,
) -> AppResult<Json<Vec<Library>>> {
    let query = ListQuery::from_pairs(params);
    let items = state.gateway(&actor).list(Scope::All, &query).await?;
    Ok(Json(items))
}

/// POST /api/v1/libraries
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<Value>,
) -> AppResult<(StatusCode, Json<Library>)> {
    let created = state.gateway(&actor).create(Scope::All, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/v1/libraries/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DbId>,
) -> AppResult<Json<Library>> {
    let item = state.gateway(&actor).retrieve(Scope::All, id).await?;
    Ok(Json(item))
}

/// PUT /api/v1/libraries/{id}
pub async fn update(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DbId>,
    Json(payload): Json<Value>,
) -> AppResult<Json<Library>> {
    let item = state
        .gateway(&actor)
        .update(Scope::All, id, payload, WriteMode::Replace)
        .await?;
    Ok(Json(item))
}

/// PATCH /api/v1/libraries/{id}
pub async fn partial_update(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DbId>,
    Json(payload): Json<Value>,
) -> AppResult<Json<Library>> {
    let item = state
        .gateway(&actor)
        .update(Scope::All, id, payload, WriteMode::Partial)
        .await?;
    Ok(Json(item))
}

/// DELETE /api/v1/libraries/{id}
pub async fn delete(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.gateway(&actor).delete::<Library>(Scope::All, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/libraries/{id}/books
pub async fn list_books(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<Book>>> {
    let gateway = state.gateway(&actor);
    let library: Library = gateway.retrieve(Scope::All, id).await?;
    let books = gateway.store().shelved_books(library.id).await?;
    Ok(Json(books))
}

/// POST /api/v1/libraries/{id}/books/{book_id}
///
/// Returns 201 when the book was added and 200 when it was already shelved.
pub async fn shelve(
    State(state): State<AppState>,
    actor: Actor,
    Path((id, book_id)): Path<(DbId, DbId)>,
) -> AppResult<(StatusCode, Json<Library>)> {
    let gateway = state.gateway(&actor);
    gateway.authorize::<Library>(SHELVE, None)?;
    let library: Library = gateway.fetch(id).await?;
    let book: Book = gateway.fetch(book_id).await?;

    let added = gateway.store().shelve(library.id, book.id).await?;
    tracing::info!(library_id = id, book_id, user_id = ?actor.id(), added, "Shelved book");

    let library: Library = gateway.fetch(id).await?;
    let status = if added { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(library)))
}

/// DELETE /api/v1/libraries/{id}/books/{book_id}
pub async fn unshelve(
    State(state): State<AppState>,
    actor: Actor,
    Path((id, book_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let gateway = state.gateway(&actor);
    gateway.authorize::<Library>(UNSHELVE, None)?;
    let library: Library = gateway.fetch(id).await?;

    if !gateway.store().unshelve(library.id, book_id).await? {
        return Err(AppError::not_found("Book", book_id));
    }
    tracing::info!(library_id = id, book_id, user_id = ?actor.id(), "Unshelved book");
    Ok(StatusCode::NO_CONTENT)
}
