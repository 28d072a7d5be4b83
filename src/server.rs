//! Wiring: build state from configuration and run the HTTP server

use crate::api::{build_router, AppState};
use crate::categorize::CategorizationService;
use crate::classifier::{Classifier, GeminiClassifier};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::store::open_store;
use axum::Router;
use std::sync::Arc;
use tracing::{info, warn};

/// Initialize store, classifier and service from configuration
pub async fn init_state(config: &Config) -> Result<AppState> {
    let store = open_store(&config.store).await?;

    if config.classifier.api_key.is_none() {
        warn!("GEMINI_API_KEY is not set; categorize requests will fail");
    }
    let classifier: Arc<dyn Classifier> = Arc::new(
        GeminiClassifier::new(config.classifier.clone())
            .map_err(|e| Error::Internal(format!("Failed to create classifier: {}", e)))?,
    );

    info!(
        "Classifier: model={}, store backend={:?}",
        config.classifier.model, config.store.backend
    );

    Ok(AppState {
        service: Arc::new(CategorizationService::new(store, classifier)),
    })
}

/// Build the full application router from configuration
pub async fn build_app(config: &Config) -> Result<Router> {
    let state = init_state(config).await?;
    Ok(build_router(state, &config.server))
}

/// Bind and serve until Ctrl-C
pub async fn run(config: Config) -> Result<()> {
    let app = build_app(&config).await?;

    let address = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Server listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
