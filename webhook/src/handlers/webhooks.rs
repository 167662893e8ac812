use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse};
use conhub_connectors::ConnectorError;
use serde_json::Value;
use tracing::{debug, info};

use super::{verify_hmac_signature, ApiError, RESOURCE_UPDATES_HEADER, SIGNATURE_HEADER};
use crate::state::AppState;

/// Connector webhook handler
/// POST /api/webhooks/{connector_id}
///
/// The request body is handed to the connector as-is; the connector's
/// response body becomes the HTTP body verbatim.
pub async fn handle_connector_webhook(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let connector_id = path.into_inner();
    info!("Received webhook for connector: {}", connector_id);

    if let Some(secret) = state.config.signing_secret.as_deref() {
        let signature = req
            .headers()
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::MissingSignature)?;

        if !verify_hmac_signature(&body, signature, secret) {
            return Err(ApiError::InvalidSignature);
        }
    }

    let payload: Value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::InvalidBody(e.to_string()))?
    };

    let limit = state.config.webhook_timeout;
    let outcome = tokio::time::timeout(limit, state.registry.handle_webhook(&connector_id, payload))
        .await
        .map_err(|_| ConnectorError::Timeout(limit))??;

    for update in &outcome.resource_updates {
        info!(
            connector = %connector_id,
            resource_id = %update.id,
            trigger_default_sync = update.trigger_default_sync,
            "Resource update requested"
        );
        debug!("Resource {} settings: {}", update.id, update.settings);
    }

    let status = StatusCode::from_u16(outcome.response.status).map_err(|_| {
        ConnectorError::Runtime(format!(
            "Connector '{}' returned invalid status {}",
            connector_id, outcome.response.status
        ))
    })?;

    Ok(HttpResponse::build(status)
        .insert_header((RESOURCE_UPDATES_HEADER, outcome.resource_updates.len().to_string()))
        .json(outcome.response.body))
}
