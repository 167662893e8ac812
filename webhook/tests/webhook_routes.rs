use actix_web::{http::StatusCode, test, web, App};
use async_trait::async_trait;
use conhub_connectors::{
    config::ConnectorConfigManager, registry::ConnectorRegistry, ConnectorMetadata, ConnectorResult,
    ConnectorSchema, ConnectorServer, LogLink, LogLinkOptions, SyncEvent, SyncEventStream,
    SyncLink, WebhookOutcome, WebhookResponse,
};
use futures::StreamExt;
use serde_json::{json, Value};
use std::time::Duration;

use webhook_service::{build_registry, configure_routes, AppState, WebhookServiceConfig};

async fn debug_state(config: WebhookServiceConfig) -> AppState {
    let registry = build_registry(&ConnectorConfigManager::create_default())
        .await
        .expect("registry");
    AppState::new(registry, config)
}

macro_rules! service {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .configure(configure_routes),
        )
        .await
    };
}

fn sign(payload: &[u8], secret: &str) -> String {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(payload);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

#[actix_web::test]
async fn test_debug_webhook_echoes_body() {
    let app = service!(debug_state(WebhookServiceConfig::default()).await);

    let payload = json!({"event": "created", "data": {"id": 7, "tags": ["a", "b"]}});
    let req = test::TestRequest::post()
        .uri("/api/webhooks/debug")
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("X-Resource-Updates").unwrap(), "0");

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"echo": payload}));
}

#[actix_web::test]
async fn test_debug_webhook_echoes_empty_object() {
    let app = service!(debug_state(WebhookServiceConfig::default()).await);

    let req = test::TestRequest::post()
        .uri("/api/webhooks/debug")
        .set_json(json!({}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body, json!({"echo": {}}));
}

#[actix_web::test]
async fn test_invalid_json_is_bad_request() {
    let app = service!(debug_state(WebhookServiceConfig::default()).await);

    let req = test::TestRequest::post()
        .uri("/api/webhooks/debug")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["kind"], "invalid_body");
}

#[actix_web::test]
async fn test_unknown_connector_is_not_found() {
    let app = service!(debug_state(WebhookServiceConfig::default()).await);

    let req = test::TestRequest::post()
        .uri("/api/webhooks/nobody")
        .set_json(json!({"a": 1}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["kind"], "not_found");
}

#[actix_web::test]
async fn test_signature_required_when_secret_configured() {
    let config = WebhookServiceConfig {
        signing_secret: Some("s3cret".to_string()),
        ..Default::default()
    };
    let app = service!(debug_state(config).await);
    let payload = br#"{"ping":true}"#;

    let unsigned = test::TestRequest::post()
        .uri("/api/webhooks/debug")
        .set_payload(payload.to_vec())
        .to_request();
    assert_eq!(test::call_service(&app, unsigned).await.status(), StatusCode::UNAUTHORIZED);

    let forged = test::TestRequest::post()
        .uri("/api/webhooks/debug")
        .insert_header(("X-Hub-Signature-256", sign(payload, "wrong")))
        .set_payload(payload.to_vec())
        .to_request();
    assert_eq!(test::call_service(&app, forged).await.status(), StatusCode::UNAUTHORIZED);

    let signed = test::TestRequest::post()
        .uri("/api/webhooks/debug")
        .insert_header(("X-Hub-Signature-256", sign(payload, "s3cret")))
        .set_payload(payload.to_vec())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, signed).await;
    assert_eq!(body, json!({"echo": {"ping": true}}));
}

#[actix_web::test]
async fn test_list_and_describe_connectors() {
    let app = service!(debug_state(WebhookServiceConfig::default()).await);

    let req = test::TestRequest::get().uri("/api/connectors").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["connector_types"], json!(["debug"]));
    assert_eq!(body["connectors"][0]["instance_id"], "debug");
    assert_eq!(body["connectors"][0]["metadata"]["name"], "Debug");

    let req = test::TestRequest::get().uri("/api/connectors/debug").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["instance_id"], "debug");
    assert_eq!(body["schema"]["webhook_body"]["title"], "DebugEcho");

    let req = test::TestRequest::get().uri("/api/connectors/ghost").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_debug_sync_is_empty() {
    let app = service!(debug_state(WebhookServiceConfig::default()).await);

    let req = test::TestRequest::post()
        .uri("/api/connectors/debug/sync")
        .set_json(json!({"destination": "debug"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["events_received"], 0);
    assert_eq!(body["events_written"], 0);
    assert_eq!(body["errors"], json!([]));
    assert_eq!(body["aborted"], false);
}

#[actix_web::test]
async fn test_malformed_sync_body_uses_error_shape() {
    let app = service!(debug_state(WebhookServiceConfig::default()).await);

    for payload in ["{not json", r#"{"destination": 42}"#] {
        let req = test::TestRequest::post()
            .uri("/api/connectors/debug/sync")
            .insert_header(("Content-Type", "application/json"))
            .set_payload(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["kind"], "invalid_body");
        assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON body"));
    }
}

#[actix_web::test]
async fn test_health() {
    let app = service!(debug_state(WebhookServiceConfig::default()).await);

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["connectors"], 1);
}

/// Connector exercising status codes, resource updates and slow webhooks.
struct ScriptedSchema;

impl ConnectorSchema for ScriptedSchema {
    type SourceConfig = Value;
    type DestinationConfig = LogLinkOptions;
    type Record = Value;
    type WebhookInput = Value;
    type WebhookBody = Value;
    type ResourceSettings = Value;
}

struct ScriptedConnector {
    metadata: ConnectorMetadata,
}

#[async_trait]
impl ConnectorServer for ScriptedConnector {
    type Schema = ScriptedSchema;

    fn metadata(&self) -> &ConnectorMetadata {
        &self.metadata
    }

    fn source_sync(&self, _config: Value) -> ConnectorResult<SyncEventStream<Value>> {
        let events = vec![
            Ok(SyncEvent::data("row", "1", json!({"v": 1}))),
            Ok(SyncEvent::data("row", "2", json!({"v": 2}))),
            Ok(SyncEvent::Commit),
        ];
        Ok(futures::stream::iter(events).boxed())
    }

    fn destination_sync(&self, config: LogLinkOptions) -> ConnectorResult<Box<dyn SyncLink<Value>>> {
        Ok(Box::new(LogLink::new(config)))
    }

    async fn handle_webhook(&self, input: Value) -> ConnectorResult<WebhookOutcome<Value, Value>> {
        if let Some(ms) = input.get("sleep_ms").and_then(|v| v.as_u64()) {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }

        let updates = input
            .get("resources")
            .and_then(|v| v.as_array())
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| id.as_str())
                    .map(|id| conhub_connectors::ResourceUpdate::new(id, json!({"source": "scripted"})))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        Ok(WebhookOutcome {
            resource_updates: updates,
            response: WebhookResponse::with_status(202, json!({"accepted": true})),
        })
    }
}

async fn scripted_state(timeout: Duration) -> AppState {
    let registry = ConnectorRegistry::new();
    registry
        .register(ScriptedConnector {
            metadata: ConnectorMetadata {
                id: "scripted".to_string(),
                name: "Scripted".to_string(),
                version: "0.1.0".to_string(),
                description: "Test connector".to_string(),
            },
        })
        .await
        .unwrap();

    let config = WebhookServiceConfig {
        webhook_timeout: timeout,
        ..Default::default()
    };
    AppState::new(registry, config)
}

#[actix_web::test]
async fn test_status_and_resource_updates_pass_through() {
    let app = service!(scripted_state(Duration::from_secs(5)).await);

    let req = test::TestRequest::post()
        .uri("/api/webhooks/scripted")
        .set_json(json!({"resources": ["res_1", "res_2"]}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    assert_eq!(resp.headers().get("X-Resource-Updates").unwrap(), "2");
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"accepted": true}));
}

#[actix_web::test]
async fn test_slow_webhook_times_out() {
    let app = service!(scripted_state(Duration::from_millis(20)).await);

    let req = test::TestRequest::post()
        .uri("/api/webhooks/scripted")
        .set_json(json!({"sleep_ms": 2000}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::GATEWAY_TIMEOUT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["kind"], "timeout");
    assert_eq!(body["error"], "Timed out after 20ms");
}

#[actix_web::test]
async fn test_sync_into_debug_destination() {
    let state = scripted_state(Duration::from_secs(5)).await;
    state
        .registry
        .register(debug_connector::DebugConnector::new())
        .await
        .unwrap();
    let app = service!(state);

    let req = test::TestRequest::post()
        .uri("/api/connectors/scripted/sync")
        .set_json(json!({"destination": "debug", "destination_config": {"prefix": "it"}}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["events_received"], 3);
    assert_eq!(body["events_written"], 3);
}

