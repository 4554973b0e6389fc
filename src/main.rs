use rusty_catalog::{
    adapters::json_file::JsonFileCatalogStore,
    api::{handlers::AppState, router::create_router},
    application::catalog::{load_catalog, save_catalog},
    config::AppConfig,
    ports::CatalogStore,
};
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rusty_catalog=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");

    tracing::info!(
        "Catalog files: {} / {}",
        config.books_path.display(),
        config.members_path.display()
    );

    // Initialize adapters
    let store: Arc<dyn CatalogStore> = Arc::new(JsonFileCatalogStore::new(
        config.books_path.clone(),
        config.members_path.clone(),
    ));

    // Load persisted state
    let catalog = load_catalog(store.as_ref(), config.catalog)
        .await
        .expect("Failed to load catalog");

    // Create application state
    let app_state = Arc::new(AppState::new(catalog, store.clone()));

    // Create router
    let app = create_router(app_state.clone());

    // Server configuration
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");

    // Save on shutdown
    let catalog = app_state.catalog.lock().await;
    if let Err(e) = save_catalog(store.as_ref(), &catalog).await {
        tracing::error!("Failed to save catalog on shutdown: {:?}", e);
        std::process::exit(1);
    }
}

/// Ctrl+C または SIGTERM を待つ
///
/// 待ち受けの登録に失敗したシグナルは無視し、もう一方を待ち続ける。
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutting down");
}
