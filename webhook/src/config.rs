use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3015;
/// Matches the request-duration limit of the hosting platform.
pub const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 300;

/// Webhook service configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct WebhookServiceConfig {
    pub host: String,
    pub port: u16,
    pub webhook_timeout: Duration,
    pub connector_config_path: PathBuf,
    /// When set, inbound webhooks must carry a valid `X-Hub-Signature-256`.
    pub signing_secret: Option<String>,
}

impl Default for WebhookServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            webhook_timeout: Duration::from_secs(DEFAULT_WEBHOOK_TIMEOUT_SECS),
            connector_config_path: PathBuf::from("./config/connectors.json"),
            signing_secret: None,
        }
    }
}

impl WebhookServiceConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: env::var("WEBHOOK_SERVICE_HOST").unwrap_or(defaults.host),
            port: parse_var("WEBHOOK_SERVICE_PORT").unwrap_or(defaults.port),
            webhook_timeout: parse_var("WEBHOOK_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.webhook_timeout),
            connector_config_path: env::var("CONNECTOR_CONFIG_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.connector_config_path),
            signing_secret: env::var("WEBHOOK_SIGNING_SECRET")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring unparseable {}={:?}, using default", name, raw);
            None
        }
    }
}
