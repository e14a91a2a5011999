use anyhow::Context;

use cardstock_infra::AppConfig;
use cardstock_observability::LogFormat;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the environment may be set directly.
    let _ = dotenvy::dotenv();

    cardstock_observability::init(LogFormat::from_env());

    let config = AppConfig::from_env().context("invalid configuration")?;
    let app = cardstock_api::app::build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
