//! Fraud scoring server - main entry point
//!
//! Loads the model bundle once at startup into an explicitly owned state
//! object, then serves predictions over HTTP.

use axum::{
    routing::{get, post},
    Router,
};
use fraudscore::{config::Config, handlers, AppState, ModelBundle};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fraudscore=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing::info!("Fraud scoring server starting...");
    tracing::info!("Model directory: {}", config.model_dir);

    // Load model artifacts once; immutable for the life of the process
    let bundle = ModelBundle::load(&config.model_dir)
        .expect("Failed to load model bundle - run the `train` binary first");

    tracing::info!(
        "Model bundle loaded (woe map: {})",
        if bundle.fitted_params.woe.is_some() {
            "fitted"
        } else {
            "absent"
        }
    );

    let state = AppState {
        bundle: Arc::new(bundle),
        config: config.clone(),
    };

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/api/v1/predict", post(handlers::predict::predict))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
