//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{open_json_store, Argon2Hasher, DbAdapter, OpenAiAdviceAdapter, UnavailableAdvisor},
    config::{Config, StoreBackend},
    error::ApiError,
    web::{self, rest::ApiDoc, state::AppState},
};
use async_openai::{config::OpenAIConfig, Client};
use axum::Router;
use salon_core::ports::{RecordStore, StyleAdvisor};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Open the Record Store ---
    let store: Arc<dyn RecordStore> = match &config.store {
        StoreBackend::Postgres(url) => {
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new().max_connections(5).connect(url).await?;
            let db_adapter = DbAdapter::new(db_pool);
            info!("Running database migrations...");
            db_adapter.run_migrations().await?;
            info!("Database migrations complete.");
            Arc::new(db_adapter)
        }
        StoreBackend::JsonFile(path) => {
            info!("Using JSON data file {}", path.display());
            Arc::new(open_json_store(path).await?)
        }
    };

    // --- 3. Initialize Service Adapters ---
    let advisor: Arc<dyn StyleAdvisor> = match &config.openai_api_key {
        Some(key) => {
            let openai_client = Client::with_config(OpenAIConfig::new().with_api_key(key));
            Arc::new(OpenAiAdviceAdapter::new(
                openai_client,
                config.advice_model.clone(),
            ))
        }
        None => {
            warn!("OPENAI_API_KEY not set; the style consultant is disabled");
            Arc::new(UnavailableAdvisor)
        }
    };

    // --- 4. Build the Shared AppState & Seed Defaults ---
    let app_state = Arc::new(AppState::new(
        store,
        Arc::new(Argon2Hasher::new()),
        advisor,
        config.clone(),
    ));
    if config.admin_password.is_none() {
        warn!("ADMIN_PASSWORD not set; no admin account will be created");
    }
    app_state.seed().await?;

    // --- 5. Create the Web Router ---
    let app = Router::new()
        .merge(web::router(app_state)?)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
