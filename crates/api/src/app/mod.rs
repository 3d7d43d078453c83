//! HTTP application wiring (Axum router + service wiring).
//!
//! Folder layout:
//! - `service.rs`: the account service (lookup → permission check → mutate)
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response DTOs and JSON mapping
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, routing::post, Extension, Router};

use portal_auth::{CredentialHasher, TokenService};
use portal_directory::{AccountDirectory, InMemoryDirectory, PostgresDirectory};

use crate::{config::AppConfig, middleware};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod service;

use service::AccountService;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let directory = build_directory(config).await?;
    let tokens = TokenService::new(&config.token)?;
    let service = Arc::new(AccountService::new(
        directory,
        CredentialHasher::new(),
        tokens,
    ));

    Ok(build_router(service))
}

/// Router over an already-built service (used directly by tests).
pub fn build_router(service: Arc<AccountService>) -> Router {
    let auth_state = middleware::AuthState {
        service: service.clone(),
    };

    // Registration and login are the only unauthenticated account routes.
    let public = Router::new()
        .route("/accounts", post(routes::accounts::create))
        .route("/accounts/token", post(routes::accounts::login));

    let protected = routes::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(public)
        .merge(protected)
        .layer(Extension(service))
}

async fn build_directory(config: &AppConfig) -> anyhow::Result<Arc<dyn AccountDirectory>> {
    match &config.database_url {
        Some(url) => {
            let pool = sqlx::PgPool::connect(url).await?;
            let directory = PostgresDirectory::new(pool);
            directory.migrate().await?;
            tracing::info!("using postgres account directory");
            Ok(Arc::new(directory))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory account directory");
            Ok(Arc::new(InMemoryDirectory::new()))
        }
    }
}
