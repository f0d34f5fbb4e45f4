use anyhow::Context;

use myblog_api::app::{AppState, build_app};
use myblog_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    myblog_observability::init();

    let config = AppConfig::from_env().context("failed to load configuration")?;
    let bind_addr = config.bind_addr;

    let state = AppState::from_config(config)
        .await
        .context("failed to build application state")?;
    let app = build_app(state).context("failed to register routes")?;

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
