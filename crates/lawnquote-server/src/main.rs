mod api;
mod middleware;

use std::sync::Arc;

use anyhow::Context;
use lawnquote_core::Catalog;
use lawnquote_providers::PropertyAnalyzer;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = lawnquote_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let catalog = match &config.catalog_path {
        Some(path) => lawnquote_core::load_catalog(path)
            .with_context(|| format!("loading catalog from {}", path.display()))?,
        None => Catalog::builtin(),
    };
    tracing::info!(services = catalog.services.len(), "service catalog loaded");

    let analyzer = PropertyAnalyzer::from_app_config(&config)?;
    let sources = analyzer.sources();
    tracing::info!(
        addy = sources.addy,
        google = sources.google,
        linz = sources.linz,
        "external sources configured"
    );

    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL is required to run the server")?;
    let pool_config = lawnquote_db::PoolConfig::from_app_config(&config);
    let pool = lawnquote_db::connect_pool(database_url, pool_config).await?;
    let applied = lawnquote_db::run_migrations(&pool).await?;
    tracing::info!(applied, "migrations up to date");

    let auth = AuthState::from_env(config.is_development())?;
    let state = AppState {
        pool,
        analyzer: Arc::new(analyzer),
        catalog: Arc::new(catalog),
    };
    let app = build_app(state, auth, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "lawnquote-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
