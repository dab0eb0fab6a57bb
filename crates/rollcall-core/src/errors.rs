//! Application error type with HTTP response conversion.
//!
//! Every fallible operation in the API returns [`AppError`]. An error carries
//! an [`ErrorKind`] from the domain taxonomy, the HTTP status it maps to, and
//! the underlying [`anyhow::Error`] whose message is surfaced to the caller.
//!
//! Response bodies have the shape:
//!
//! ```json
//! { "error": "Attendance already marked for this date", "code": "DUPLICATE_RECORD" }
//! ```

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

/// The error taxonomy shared by every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// No caller token, or the token could not be resolved to a user.
    Unauthenticated,
    /// The caller is known but the policy denies the operation.
    Forbidden,
    /// The target record is absent or not owned by the caller.
    NotFound,
    /// A uniqueness constraint was violated.
    DuplicateRecord,
    /// The operation is not valid for the entity's current state.
    InvalidState,
    /// Missing or malformed input.
    ValidationError,
    /// Unexpected failure (storage, token signing, ...).
    Internal,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Unauthenticated => "UNAUTHENTICATED",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::DuplicateRecord => "DUPLICATE_RECORD",
            ErrorKind::InvalidState => "INVALID_STATE",
            ErrorKind::ValidationError => "VALIDATION_ERROR",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }

    /// Default status for the kind. Validation failures on unparseable bodies
    /// override this with `400`.
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::DuplicateRecord => StatusCode::CONFLICT,
            ErrorKind::InvalidState => StatusCode::BAD_REQUEST,
            ErrorKind::ValidationError => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub kind: ErrorKind,
    pub status: StatusCode,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(kind: ErrorKind, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            kind,
            status: kind.status(),
            error: err.into(),
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthenticated, anyhow::anyhow!(msg.into()))
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, anyhow::anyhow!(msg.into()))
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::NotFound, err)
    }

    pub fn duplicate<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::DuplicateRecord, err)
    }

    pub fn invalid_state<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::InvalidState, err)
    }

    pub fn unprocessable<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::ValidationError, err)
    }

    /// A validation failure reported with `400 Bad Request`, used when the
    /// request body could not be parsed at all.
    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::ValidationError, err).with_status(StatusCode::BAD_REQUEST)
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Internal, err)
    }

    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self::internal(anyhow::anyhow!(msg.into()))
    }

    pub fn database<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::internal(err)
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.code(), self.error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.kind == ErrorKind::Internal {
            tracing::error!(error = ?self.error, "Internal server error");
        }

        // Internal details stay in the logs.
        let message = if self.kind == ErrorKind::Internal {
            "Internal server error".to_string()
        } else {
            self.error.to_string()
        };

        let body = Json(json!({
            "error": message,
            "code": self.kind.code(),
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}

/// Error body as documented in the OpenAPI schema.
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_kind_status_mapping() {
        assert_eq!(ErrorKind::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorKind::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorKind::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorKind::DuplicateRecord.status(), StatusCode::CONFLICT);
        assert_eq!(ErrorKind::InvalidState.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorKind::ValidationError.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_bad_request_keeps_validation_kind() {
        let err = AppError::bad_request(anyhow::anyhow!("reason is required"));
        assert_eq!(err.kind, ErrorKind::ValidationError);
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_duplicate_response_body() {
        let (status, body) =
            body_json(AppError::duplicate(anyhow::anyhow!("already marked"))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "DUPLICATE_RECORD");
        assert_eq!(body["error"], "already marked");
    }

    #[tokio::test]
    async fn test_internal_message_is_hidden() {
        let (status, body) =
            body_json(AppError::internal_error("connection reset by peer")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "INTERNAL_ERROR");
        assert_eq!(body["error"], "Internal server error");
    }
}
