use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use tracing::info;

use webhook_service::{build_registry, configure_routes, load_connector_config, AppState, WebhookServiceConfig};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    conhub_observability::init_tracing_for("webhook-service");

    let config = WebhookServiceConfig::from_env();
    let connector_config = load_connector_config(&config.connector_config_path)?;
    let registry = build_registry(&connector_config).await?;

    info!(
        "🚀 [Webhook Service] Starting on {}:{} with {} connector(s), webhook timeout {}s",
        config.host,
        config.port,
        registry.list_active().await.len(),
        config.webhook_timeout.as_secs()
    );

    let bind = (config.host.clone(), config.port);
    let state = AppState::new(registry, config);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .supports_credentials();

        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(cors)
            .wrap(Logger::default())
            .configure(configure_routes)
    })
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}
