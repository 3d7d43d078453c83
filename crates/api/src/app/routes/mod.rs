//! Protected route tree. Public routes (registration, login, health) are
//! wired in `app::build_router`.

use axum::routing::{get, patch};
use axum::Router;

pub mod accounts;
pub mod admin;
pub mod system;

pub fn router() -> Router {
    Router::new()
        .route("/accounts/me", get(accounts::me))
        .route(
            "/accounts/:id",
            get(accounts::get_by_id)
                .patch(accounts::update)
                .delete(accounts::remove),
        )
        .route(
            "/accounts/:id/admin",
            patch(admin::promote).delete(admin::demote),
        )
}
