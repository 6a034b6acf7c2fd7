use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use folio_core::error::{CoreError, FieldErrors};
use folio_core::permissions::Denial;
use folio_db::StoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`StoreError`] for persistence
/// failures. Implements [`IntoResponse`] to produce consistent JSON error
/// bodies of the form `{"error", "code"[, "fields"]}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `folio_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A persistence error from `folio_db`.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<Denial> for AppError {
    fn from(denial: Denial) -> Self {
        AppError::Core(denial.into())
    }
}

impl AppError {
    /// Shorthand for a [`CoreError::NotFound`].
    pub fn not_found(entity: &'static str, id: folio_core::types::DbId) -> Self {
        AppError::Core(CoreError::NotFound { entity, id })
    }
}

const INTERNAL_MESSAGE: &str = "An internal error occurred";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut fields: Option<FieldErrors> = None;

        let (status, code, message) = match self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(errors) => {
                    fields = Some(errors);
                    (
                        StatusCode::BAD_REQUEST,
                        "VALIDATION_ERROR",
                        "Validation failed".to_string(),
                    )
                }
                CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        INTERNAL_MESSAGE.to_string(),
                    )
                }
            },

            // --- Store errors ---
            AppError::Store(err) => match err {
                StoreError::Integrity { field, message } => {
                    fields = Some(FieldErrors::single(field, message));
                    (
                        StatusCode::BAD_REQUEST,
                        "VALIDATION_ERROR",
                        "Validation failed".to_string(),
                    )
                }
                StoreError::Unavailable(msg) => {
                    tracing::error!(error = %msg, "Store unavailable");
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "SERVICE_UNAVAILABLE",
                        "The data store is temporarily unavailable".to_string(),
                    )
                }
                StoreError::Database(err) => {
                    tracing::error!(error = %err, "Database error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        INTERNAL_MESSAGE.to_string(),
                    )
                }
            },

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    INTERNAL_MESSAGE.to_string(),
                )
            }
        };

        let body = match fields {
            Some(fields) => json!({
                "error": message,
                "code": code,
                "fields": fields,
            }),
            None => json!({
                "error": message,
                "code": code,
            }),
        };

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use serde_json::Value;

    use super::*;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_error_lists_fields() {
        let err = AppError::Core(CoreError::Validation(FieldErrors::single(
            "title",
            "This field is required.",
        )));
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["fields"]["title"][0], "This field is required.");
    }

    #[tokio::test]
    async fn integrity_violation_is_a_field_error() {
        let err = AppError::Store(StoreError::missing_reference("author", 99));
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["fields"]["author"][0], "Invalid pk \"99\" - object does not exist.");
    }

    #[tokio::test]
    async fn uniqueness_violation_is_400_not_409() {
        let err = AppError::Store(StoreError::integrity(
            FieldErrors::NON_FIELD,
            "The fields title, author must make a unique set.",
        ));
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["fields"]["non_field_errors"].is_array());
    }

    #[tokio::test]
    async fn unavailable_store_is_503_without_details() {
        let err = AppError::Store(StoreError::Unavailable("pool timed out on 10.0.0.5".into()));
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!body["error"].as_str().unwrap().contains("10.0.0.5"));
        assert!(body.get("fields").is_none());
    }

    #[tokio::test]
    async fn denial_maps_to_401_or_403() {
        let (status, _) = render(Denial::Unauthenticated.into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = render(Denial::NotOwner.into()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
