//! Account CRUD and login handlers.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    Json,
};
use uuid::Uuid;

use portal_core::AccountId;

use crate::app::dto::{
    CreateAccountRequest, DeletedAccountResponse, LoginRequest, ShowAccount, TokenResponse,
    UpdateAccountRequest, UpdatedAccountResponse,
};
use crate::app::errors::ApiError;
use crate::app::service::AccountService;
use crate::context::CurrentAccount;

/// POST /accounts: register a new account (public).
pub async fn create(
    Extension(service): Extension<Arc<AccountService>>,
    Json(body): Json<CreateAccountRequest>,
) -> Result<Json<ShowAccount>, ApiError> {
    let account = service
        .register(body.username, &body.email, &body.password)
        .await?;
    Ok(Json(account.into()))
}

/// POST /accounts/token: exchange credentials for a bearer token (public).
pub async fn login(
    Extension(service): Extension<Arc<AccountService>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = service.login(&body.email, &body.password).await?;
    Ok(Json(TokenResponse::bearer(token)))
}

/// GET /accounts/me: the account behind the presented token.
pub async fn me(
    Extension(current): Extension<CurrentAccount>,
) -> Json<ShowAccount> {
    Json(current.0.into())
}

/// GET /accounts/:id
pub async fn get_by_id(
    Extension(service): Extension<Arc<AccountService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ShowAccount>, ApiError> {
    let account = service.get_account(AccountId::from_uuid(id)).await?;
    Ok(Json(account.into()))
}

/// PATCH /accounts/:id
pub async fn update(
    Extension(service): Extension<Arc<AccountService>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateAccountRequest>,
) -> Result<Json<UpdatedAccountResponse>, ApiError> {
    let updated = service
        .update_account(
            current.account(),
            AccountId::from_uuid(id),
            body.username,
            body.email,
        )
        .await?;
    Ok(Json(UpdatedAccountResponse {
        updated_account_id: updated,
    }))
}

/// DELETE /accounts/:id (soft delete).
pub async fn remove(
    Extension(service): Extension<Arc<AccountService>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletedAccountResponse>, ApiError> {
    let deleted = service
        .delete_account(current.account(), AccountId::from_uuid(id))
        .await?;
    Ok(Json(DeletedAccountResponse {
        deleted_account_id: deleted,
    }))
}
