//! Admin grant/revoke handlers (super-admin only).

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    Json,
};
use uuid::Uuid;

use portal_core::AccountId;

use crate::app::dto::UpdatedAccountResponse;
use crate::app::errors::ApiError;
use crate::app::service::AccountService;
use crate::context::CurrentAccount;

/// PATCH /accounts/:id/admin: grant the admin role.
pub async fn promote(
    Extension(service): Extension<Arc<AccountService>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<Uuid>,
) -> Result<Json<UpdatedAccountResponse>, ApiError> {
    let updated = service
        .promote(current.account(), AccountId::from_uuid(id))
        .await?;
    Ok(Json(UpdatedAccountResponse {
        updated_account_id: updated,
    }))
}

/// DELETE /accounts/:id/admin: revoke the admin role.
pub async fn demote(
    Extension(service): Extension<Arc<AccountService>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<Uuid>,
) -> Result<Json<UpdatedAccountResponse>, ApiError> {
    let updated = service
        .demote(current.account(), AccountId::from_uuid(id))
        .await?;
    Ok(Json(UpdatedAccountResponse {
        updated_account_id: updated,
    }))
}
