use anyhow::Context;

use bazaar_api::config::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;

    bazaar_observability::init_with(&settings.log_level, settings.log_format);

    if settings.uses_dev_secret() {
        tracing::warn!("SECRET_KEY not set; using insecure dev default");
    }

    let app = bazaar_api::app::build_app(&settings)?;

    let listener = tokio::net::TcpListener::bind(settings.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
