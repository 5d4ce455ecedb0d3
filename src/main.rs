use anyhow::Context;
use lexbridge::config_store::StaticConfig;
use lexbridge::server::build_router;
use lexbridge::util::{env_bind_addr, init_tracing, AppState};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();

    // Check for --settings flag
    let settings_arg = args
        .iter()
        .find(|a| a.starts_with("--settings="))
        .and_then(|a| a.strip_prefix("--settings="))
        .map(|s| s.to_string());

    let settings = match settings_arg {
        Some(path) => {
            tracing::info!("Loading settings from: {}", path);
            let config = StaticConfig::load_from_file(&path)?;
            tracing::info!("Loaded {} settings", config.len());
            Some(config)
        }
        None => {
            tracing::info!("No settings file provided, reading LEXBRIDGE_* environment variables");
            tracing::info!("Usage: {} [--settings=settings.json]", args[0]);
            None
        }
    };

    let state = AppState::from_env(settings).context("failed to initialize adapters")?;
    tracing::info!(tools = ?state.tool_names(), "adapters ready");

    let app = build_router(Arc::new(state));
    let addr = env_bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("lexbridge listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
