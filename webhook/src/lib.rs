//! Webhook service: exposes registered connectors over HTTP.

use actix_web::web;
use conhub_connectors::{config::ConnectorConfigManager, registry::ConnectorRegistry};
use debug_connector::DebugConnectorFactory;
use std::path::Path;
use tracing::{info, warn};

use handlers::ApiError;

pub mod config;
pub mod handlers;
pub mod state;

pub use config::WebhookServiceConfig;
pub use state::AppState;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/webhooks")
            .route("/{connector_id}", web::post().to(handlers::webhooks::handle_connector_webhook)),
    )
    .service(
        web::scope("/api/connectors")
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                ApiError::InvalidBody(err.to_string()).into()
            }))
            .route("", web::get().to(handlers::connectors::list_connectors))
            .route("/{connector_id}", web::get().to(handlers::connectors::get_connector))
            .route("/{connector_id}/sync", web::post().to(handlers::connectors::run_sync)),
    )
    .route("/health", web::get().to(health_check));
}

async fn health_check(state: web::Data<AppState>) -> web::Json<serde_json::Value> {
    web::Json(serde_json::json!({
        "status": "healthy",
        "service": "webhook-service",
        "connectors": state.registry.list_active().await.len(),
        "timestamp": chrono::Utc::now()
    }))
}

/// Register every built-in connector type and activate the enabled instances.
pub async fn build_registry(manager: &ConnectorConfigManager) -> anyhow::Result<ConnectorRegistry> {
    let mut registry = ConnectorRegistry::new();
    registry.register_factory(Box::new(DebugConnectorFactory::new()))?;

    for (instance_id, e) in registry.activate_all(manager).await {
        warn!("[Webhook Service] Connector '{}' not started: {}", instance_id, e);
    }

    Ok(registry)
}

/// Load connector instances. A missing file is replaced by the defaults,
/// which are saved to `path`; an unreadable or malformed file is an error and
/// is left untouched.
pub fn load_connector_config(path: &Path) -> anyhow::Result<ConnectorConfigManager> {
    if !path.exists() {
        info!(
            "[Webhook Service] {} not found, using default connector configuration",
            path.display()
        );
        let config = ConnectorConfigManager::create_default();
        if let Err(e) = config.save_to_file(path) {
            warn!("[Webhook Service] Failed to save default config: {}", e);
        }
        return Ok(config);
    }

    let config = ConnectorConfigManager::load_from_file(path)
        .map_err(|e| anyhow::anyhow!("Invalid connector configuration {}: {}", path.display(), e))?;
    info!("[Webhook Service] Loaded connector configuration from {}", path.display());
    Ok(config)
}
