use actix_web::{web, HttpResponse};
use conhub_connectors::{
    registry::{ActiveConnector, SyncRequest},
    runner::ErrorPolicy,
    ConnectorError, SchemaDescription,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct ConnectorsResponse {
    pub connectors: Vec<ActiveConnector>,
    pub connector_types: Vec<String>,
}

#[derive(Serialize)]
pub struct ConnectorDetails {
    #[serde(flatten)]
    pub connector: ActiveConnector,
    pub schema: SchemaDescription,
}

#[derive(Debug, Deserialize)]
pub struct SyncBody {
    pub destination: String,
    #[serde(default)]
    pub source_config: Value,
    #[serde(default)]
    pub destination_config: Value,
    #[serde(default)]
    pub policy: ErrorPolicy,
}

/// GET /api/connectors
pub async fn list_connectors(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ConnectorsResponse {
        connectors: state.registry.list_active().await,
        connector_types: state.registry.list_connector_types(),
    })
}

/// GET /api/connectors/{connector_id}
pub async fn get_connector(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let instance_id = path.into_inner();
    let connector = state
        .registry
        .get(&instance_id)
        .await
        .ok_or_else(|| ConnectorError::NotFound(format!("Connector '{}' not found", instance_id)))?;

    Ok(HttpResponse::Ok().json(ConnectorDetails {
        connector: ActiveConnector {
            instance_id,
            metadata: connector.metadata().clone(),
        },
        schema: connector.schema(),
    }))
}

/// POST /api/connectors/{connector_id}/sync
pub async fn run_sync(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<SyncBody>,
) -> Result<HttpResponse, ApiError> {
    let source = path.into_inner();
    let body = body.into_inner();
    info!("Sync requested: {} -> {}", source, body.destination);

    let summary = state
        .registry
        .run_sync(SyncRequest {
            source,
            source_config: body.source_config,
            destination: body.destination,
            destination_config: body.destination_config,
            policy: body.policy,
        })
        .await?;

    Ok(HttpResponse::Ok().json(summary))
}
