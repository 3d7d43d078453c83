//! Error → HTTP response mapping.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use portal_core::AuthError;

/// Wrapper so handlers can `?` any `AuthError` straight into a response.
#[derive(Debug)]
pub struct ApiError(pub AuthError);

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        auth_error_to_response(self.0)
    }
}

pub fn auth_error_to_response(err: AuthError) -> axum::response::Response {
    match err {
        AuthError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", err.to_string()),
        AuthError::Forbidden => json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string()),
        AuthError::SelfTargetNotAllowed => {
            json_error(StatusCode::BAD_REQUEST, "self_target", err.to_string())
        }
        AuthError::AlreadyPrivileged | AuthError::NotPrivileged => {
            json_error(StatusCode::CONFLICT, "privilege_conflict", err.to_string())
        }
        AuthError::SuperAdminImmutable => {
            json_error(StatusCode::NOT_ACCEPTABLE, "super_admin_immutable", err.to_string())
        }
        AuthError::DuplicateUsername | AuthError::DuplicateEmail => {
            json_error(StatusCode::CONFLICT, "duplicate", err.to_string())
        }
        AuthError::InvalidCredentials => {
            json_error(StatusCode::UNAUTHORIZED, "invalid_credentials", err.to_string())
        }
        AuthError::TokenInvalid(_) => {
            // token detail goes to logs, not to the caller
            tracing::debug!(error = %err, "token rejected");
            json_error(
                StatusCode::UNAUTHORIZED,
                "invalid_token",
                "could not validate credentials",
            )
        }
        AuthError::Validation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg)
        }
        AuthError::Store(detail) => {
            tracing::error!(%detail, "store failure surfaced to boundary");
            json_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "store_error",
                "storage unavailable",
            )
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
