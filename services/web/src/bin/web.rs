//! services/web/src/bin/web.rs

use async_openai::{config::OpenAIConfig, Client};
use recraftr_web::{
    adapters::{
        DbAdapter, HttpContentExtractor, HttpPaymentGateway, OpenAiBatchAdapter,
        PasswordAuthAdapter,
    },
    config::Config,
    error::ApiError,
    web::{build_router, AppState, Ports},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");
    if config.payment_dev_bypass {
        info!("PAYMENT_DEV_BYPASS is on: plans can be activated without payment");
    }

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Service Adapters ---
    let http = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .user_agent(concat!("recraftr/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let openai_config = OpenAIConfig::new().with_api_key(
        config
            .openai_api_key
            .as_ref()
            .ok_or_else(|| ApiError::Internal("OPENAI_API_KEY is required".to_string()))?,
    );
    let openai_client = Client::with_config(openai_config);

    let auth_adapter = Arc::new(PasswordAuthAdapter::new(
        db_adapter.clone(),
        http.clone(),
        config.google_client_id.clone(),
    ));
    let extractor = Arc::new(
        HttpContentExtractor::new(http.clone()).map_err(|e| ApiError::Internal(e.to_string()))?,
    );
    let generator = Arc::new(OpenAiBatchAdapter::new(
        openai_client,
        config.generation_model.clone(),
    ));
    let payment_gateway = Arc::new(HttpPaymentGateway::new(
        http,
        config.payment_backend_url.clone(),
        config.stripe_api_base.clone(),
        config.stripe_publishable_key.clone(),
    ));

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(
        config.clone(),
        Ports {
            auth: auth_adapter,
            users: db_adapter.clone(),
            history: db_adapter,
            extractor,
            generator,
            payments: payment_gateway,
        },
    ));

    // --- 5. Create the Web Router ---
    let app = build_router(app_state);

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
