use anyhow::{Context, Result};
use loanlens::{config::Config, proxy};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) load config ──────────────────────────────────────────────
    let config = Config::from_env()?;
    info!(upstream = %config.upstream_url, bind = %config.bind_addr, "configured");

    // ─── 3) serve the forwarder ──────────────────────────────────────
    let state = Arc::new(proxy::ProxyState::new(config.upstream_url));
    let app = proxy::router(state);
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    info!("listening on {}", config.bind_addr);
    axum::serve(listener, app).await.context("serving proxy")?;

    Ok(())
}
