use crate::error::{ConnectorError, ConnectorResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Connector instance configuration manager
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectorConfigManager {
    pub connectors: BTreeMap<String, ConnectorInstanceConfig>,
}

/// Individual connector instance configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectorInstanceConfig {
    pub instance_id: String,
    pub connector_type: String, // e.g., "debug"
    pub enabled: bool,
    #[serde(default)]
    pub settings: serde_json::Value,
}

impl ConnectorConfigManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> ConnectorResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConnectorError::Configuration(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&content)?;

        for (key, instance) in &config.connectors {
            if key != &instance.instance_id {
                return Err(ConnectorError::Configuration(format!(
                    "Entry '{}' in {} declares instance_id '{}'",
                    key,
                    path.display(),
                    instance.instance_id
                )));
            }
        }

        Ok(config)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> ConnectorResult<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConnectorError::Configuration(format!("Cannot create {}: {}", parent.display(), e))
            })?;
        }
        std::fs::write(path, content).map_err(|e| {
            ConnectorError::Configuration(format!("Cannot write {}: {}", path.display(), e))
        })
    }

    pub fn add_connector(&mut self, config: ConnectorInstanceConfig) {
        self.connectors.insert(config.instance_id.clone(), config);
    }

    pub fn remove_connector(&mut self, instance_id: &str) -> Option<ConnectorInstanceConfig> {
        self.connectors.remove(instance_id)
    }

    pub fn get_connector(&self, instance_id: &str) -> Option<&ConnectorInstanceConfig> {
        self.connectors.get(instance_id)
    }

    pub fn list_enabled(&self) -> Vec<&ConnectorInstanceConfig> {
        self.connectors.values().filter(|c| c.enabled).collect()
    }

    /// Default configuration: a single enabled debug connector.
    pub fn create_default() -> Self {
        let mut manager = Self::new();
        manager.add_connector(ConnectorInstanceConfig {
            instance_id: "debug".to_string(),
            connector_type: "debug".to_string(),
            enabled: true,
            settings: serde_json::Value::Null,
        });
        manager
    }
}
