use std::sync::Arc;

use dossier_app::app::service;
use dossier_app::store_handler::StoreHandler;
use dossier_core::config::load_config;
use dossier_db::db::memory::MemoryStore;
use dossier_service::auth::casbin::init_casbin;
use dossier_service::intake::patterns::builtin_patterns;
use salvo::Listener;
use salvo::conn::TcpListener;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting dossier server");

    let config = load_config()?;

    tracing::info!(config = ?config, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping debug");
    }

    let store = Arc::new(MemoryStore::with_patterns(builtin_patterns()));
    let enforcer = init_casbin().await?;

    if config.auth.tokens.is_empty() {
        tracing::warn!("No API tokens configured; every authenticated route will answer 401");
    }

    let bind_addr = config.server.bind_addr();
    let acceptor = TcpListener::new(bind_addr.clone()).bind().await;

    let service = service(
        Arc::new(config),
        StoreHandler::shared(store),
        Arc::new(enforcer),
    )?;

    tracing::info!("Server listening on {bind_addr}");

    salvo::Server::new(acceptor).serve(service).await;

    Ok(())
}
