//! Follow graph and the personal feed.

use axum::extract::{Path, State};
use axum::Json;
use folio_core::actor::Actor;
use folio_core::error::{CoreError, FieldErrors};
use folio_core::permissions::Action;
use folio_core::types::DbId;
use folio_db::models::post::Post;
use folio_db::Directory;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::policies::{FEED, FOLLOW};
use crate::response::DataResponse;
use crate::state::AppState;

pub const MSG_SELF_FOLLOW: &str = "You cannot follow yourself.";

/// Follow state between the caller and another user.
#[derive(Debug, Serialize)]
pub struct FollowStatus {
    pub user: DbId,
    pub following: bool,
}

/// GET /api/v1/feed
///
/// Posts by users the caller follows, newest first.
pub async fn feed(State(state): State<AppState>, actor: Actor) -> AppResult<Json<Vec<Post>>> {
    let gateway = state.gateway(&actor);
    gateway.authorize_kind(Action::List, FEED, None)?;
    let user_id = caller_id(&actor)?;
    let posts = state.store.feed(user_id).await?;
    Ok(Json(posts))
}

/// POST /api/v1/users/{id}/follow
pub async fn follow(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<FollowStatus>>> {
    let gateway = state.gateway(&actor);
    gateway.authorize_kind(Action::Create, FOLLOW, None)?;
    let user_id = caller_id(&actor)?;

    if id == user_id {
        return Err(CoreError::Validation(FieldErrors::single(
            FieldErrors::NON_FIELD,
            MSG_SELF_FOLLOW,
        ))
        .into());
    }
    state
        .store
        .find_user(id)
        .await?
        .ok_or(AppError::not_found("User", id))?;

    let created = state.store.follow(user_id, id).await?;
    tracing::info!(user_id, followee = id, created, "Followed user");
    follow_status(&state, user_id, id).await
}

/// POST /api/v1/users/{id}/unfollow
pub async fn unfollow(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<FollowStatus>>> {
    let gateway = state.gateway(&actor);
    gateway.authorize_kind(Action::Delete, FOLLOW, None)?;
    let user_id = caller_id(&actor)?;

    state
        .store
        .find_user(id)
        .await?
        .ok_or(AppError::not_found("User", id))?;

    let removed = state.store.unfollow(user_id, id).await?;
    tracing::info!(user_id, followee = id, removed, "Unfollowed user");
    follow_status(&state, user_id, id).await
}

/// Follow state of `user_id` towards `id` as recorded by the store.
async fn follow_status(
    state: &AppState,
    user_id: DbId,
    id: DbId,
) -> AppResult<Json<DataResponse<FollowStatus>>> {
    let following = state.store.following(user_id).await?.contains(&id);
    Ok(Json(DataResponse {
        data: FollowStatus { user: id, following },
    }))
}

/// Id of the authenticated caller. Only reachable after an authenticated-tier
/// check, so an anonymous actor here is a wiring mistake.
fn caller_id(actor: &Actor) -> AppResult<DbId> {
    actor
        .id()
        .ok_or_else(|| AppError::InternalError("authenticated route reached anonymously".into()))
}
