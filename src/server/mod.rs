use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use crate::registry::Registry;
use crate::storage::SqliteStore;

pub mod routes;

/// Server state
pub struct AppState {
    pub registry: Registry<SqliteStore>,
}

impl AppState {
    pub fn new(store: SqliteStore) -> Self {
        Self {
            registry: Registry::new(store),
        }
    }
}

/// Build the HTTP router around a shared state
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/api/v1/swift-codes", post(routes::create_swift_code))
        .route(
            "/api/v1/swift-codes/{swift_code}",
            get(routes::get_swift_code).delete(routes::delete_swift_code),
        )
        .route("/api/v1/swift-codes/country/{country_iso2}", get(routes::get_country))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(host: &str, port: u16, database_path: &Path) -> anyhow::Result<()> {
    let store = SqliteStore::open(database_path)?;
    let state = Arc::new(AppState::new(store));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    tracing::info!("Starting server on {} (database {})", addr, database_path.display());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
