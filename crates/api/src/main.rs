use anyhow::{Context, Result};
use vera_api::{build_app, ApiConfig};
use vera_observability::{init_tracing, install_panic_hook};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("vera_api");
    install_panic_hook();

    let config = ApiConfig::from_env();
    let app = build_app(&config)?;

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    tracing::info!(bind = %config.bind, "vera companion api started");

    axum::serve(listener, app).await?;
    Ok(())
}
