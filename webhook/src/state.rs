use crate::config::WebhookServiceConfig;
use conhub_connectors::registry::ConnectorRegistry;
use std::sync::Arc;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ConnectorRegistry>,
    pub config: Arc<WebhookServiceConfig>,
}

impl AppState {
    pub fn new(registry: ConnectorRegistry, config: WebhookServiceConfig) -> Self {
        Self {
            registry: Arc::new(registry),
            config: Arc::new(config),
        }
    }
}
