use portal_api::{app, config::AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    portal_observability::init();

    let config = AppConfig::from_env();
    let router = app::build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, router).await?;
    Ok(())
}
