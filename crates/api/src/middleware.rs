//! Bearer-token authentication middleware.
//!
//! The token travels as an opaque credential in the `Authorization` header;
//! this layer verifies it and resolves the subject to an account before any
//! protected handler runs.

use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use portal_core::AuthError;

use crate::app::errors::ApiError;
use crate::app::service::AccountService;
use crate::context::CurrentAccount;

#[derive(Clone)]
pub struct AuthState {
    pub service: Arc<AccountService>,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(req.headers())?;
    let account = state.service.resolve_bearer(token).await?;

    req.extensions_mut().insert(CurrentAccount(account));

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let missing = || AuthError::token_invalid("missing bearer credential");

    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(missing)?
        .to_str()
        .map_err(|_| missing())?;

    let token = header.strip_prefix("Bearer ").ok_or_else(missing)?.trim();
    if token.is_empty() {
        return Err(missing());
    }

    Ok(token)
}
