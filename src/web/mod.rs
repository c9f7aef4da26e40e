//! HTTP surface: data rate lookup, GeoJSON feeds and the static map pages.

pub mod routes;

use crate::api::ddr::SpreadingFactorResolver;
use crate::config::{Config, WebConfig};
use crate::store::Store;
use crate::util::error::MapperError;
use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared, read-only state of the handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub resolver: Arc<SpreadingFactorResolver>,
    pub measurement: String,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: &Config) -> Self {
        let ddr = config.ddr_config();
        let measurement = ddr.measurement.clone();
        Self {
            resolver: Arc::new(SpreadingFactorResolver::new(store.clone(), ddr)),
            store,
            measurement,
        }
    }
}

/// `""`, `"/"` → no prefix; `"mapper/"` → `"/mapper"`.
fn normalize_base_url(base: &str) -> Option<String> {
    let trimmed = base.trim().trim_matches('/');
    (!trimmed.is_empty()).then(|| format!("/{trimmed}"))
}

pub fn router(state: AppState, web: &WebConfig) -> Router {
    let routes = Router::new()
        .route("/", get(routes::index))
        .route("/ddr/q", get(routes::ddr))
        .route("/geojson/:data_rate", get(routes::geojson))
        .nest_service("/maps", ServeDir::new(web.assets.join("maps")))
        .with_state(state);

    let app = match normalize_base_url(&web.base_url) {
        Some(base) => Router::new().nest(&base, routes),
        None => routes,
    };

    app.layer(TraceLayer::new_for_http())
}

/// Serves until Ctrl-C or SIGTERM.
pub async fn serve(config: &Config, store: Arc<dyn Store>) -> Result<(), MapperError> {
    let app = router(AppState::new(store, config), &config.web);

    let listener = TcpListener::bind(config.web.address.as_str())
        .await
        .map_err(|e| MapperError::Server(format!("binding {}: {e}", config.web.address)))?;
    info!(address = %config.web.address, base_url = %config.web.base_url, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| MapperError::Server(e.to_string()))?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "cannot listen for SIGTERM");
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
    info!("shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url(""), None);
        assert_eq!(normalize_base_url("/"), None);
        assert_eq!(normalize_base_url("mapper/"), Some("/mapper".to_string()));
        assert_eq!(normalize_base_url("/lora/mapper"), Some("/lora/mapper".to_string()));
    }
}
