//! JWT-based actor extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use folio_core::actor::Actor;
use folio_core::error::CoreError;
use folio_db::Directory;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Accepted `Authorization` schemes. Both carry the same JWT.
const SCHEMES: [&str; 2] = ["Bearer ", "Token "];

/// Resolve the caller from the `Authorization` header.
///
/// No header yields [`Actor::Anonymous`]; permission checks decide whether
/// that is enough. A header that is present but malformed, carries an invalid
/// or expired token, or names a user that no longer exists is rejected with
/// 401.
///
/// ```ignore
/// async fn my_handler(actor: Actor, State(state): State<AppState>) -> AppResult<Json<()>> {
///     let gateway = state.gateway(&actor);
///     Ok(Json(()))
/// }
/// ```
impl FromRequestParts<AppState> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(Actor::Anonymous);
        };

        let header = header.to_str().map_err(|_| unauthorized("Invalid Authorization header"))?;

        let token = SCHEMES
            .iter()
            .find_map(|scheme| header.strip_prefix(scheme))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                unauthorized("Invalid Authorization format. Expected: Bearer <token>")
            })?;

        let claims = validate_token(token, &state.config.jwt)
            .map_err(|_| unauthorized("Invalid or expired token"))?;

        let user = state
            .store
            .find_user(claims.sub)
            .await?
            .ok_or_else(|| unauthorized("User not found"))?;

        tracing::debug!(user_id = user.id, "Authenticated request");
        Ok(Actor::User(user.into_principal()))
    }
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.to_string()))
}
