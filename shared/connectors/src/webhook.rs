use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A downstream resource whose state changed, as reported by a webhook.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct ResourceUpdate<S> {
    pub id: String,
    pub settings: S,
    /// Whether the host should schedule the resource's default sync.
    #[serde(default)]
    pub trigger_default_sync: bool,
}

impl<S> ResourceUpdate<S> {
    pub fn new(id: impl Into<String>, settings: S) -> Self {
        Self {
            id: id.into(),
            settings,
            trigger_default_sync: false,
        }
    }

    pub fn with_default_sync(mut self) -> Self {
        self.trigger_default_sync = true;
        self
    }
}

/// Immediate HTTP answer to the webhook caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct WebhookResponse<B> {
    #[serde(default = "default_status")]
    pub status: u16,
    pub body: B,
}

fn default_status() -> u16 {
    200
}

impl<B> WebhookResponse<B> {
    pub fn ok(body: B) -> Self {
        Self { status: 200, body }
    }

    pub fn with_status(status: u16, body: B) -> Self {
        Self { status, body }
    }
}

/// Result of handling one inbound webhook call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct WebhookOutcome<S, B> {
    pub resource_updates: Vec<ResourceUpdate<S>>,
    pub response: WebhookResponse<B>,
}

impl<S, B> WebhookOutcome<S, B> {
    /// Respond without requesting any resource update.
    pub fn respond(body: B) -> Self {
        Self {
            resource_updates: Vec::new(),
            response: WebhookResponse::ok(body),
        }
    }

    pub fn with_updates(mut self, updates: impl IntoIterator<Item = ResourceUpdate<S>>) -> Self {
        self.resource_updates.extend(updates);
        self
    }
}
