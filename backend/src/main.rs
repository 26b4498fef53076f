use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method},
};
use prepconnect::{
    AppState, Config, get_db_pool,
    constants::USER_ID_HEADER,
    db::{DatabaseConfig, migrations},
    router,
    services::BroadcastNotifier,
    utils,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    utils::init_logging();

    let config = Config::from_env()?;
    let db_config = DatabaseConfig {
        database_url: config.database_url.clone(),
        ..DatabaseConfig::from_env()?
    };
    let pool = get_db_pool(&db_config).await?;

    // Run migrations
    migrations::run_migrations(&pool).await?;

    let notifier = Arc::new(BroadcastNotifier::new(config.notify_channel_capacity));
    let state = AppState::new(pool, notifier);
    let app = create_app(state, &config);

    let listener = tokio::net::TcpListener::bind(&format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!("Server running on port {}", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}

fn create_app(state: AppState, config: &Config) -> Router {
    router(state)
        .layer(create_cors_layer(config))
        .layer(TraceLayer::new_for_http())
}

fn create_cors_layer(config: &Config) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            HeaderName::from_static(USER_ID_HEADER),
        ])
        .allow_credentials(false);

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        // Default to permissive for development
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(origins)
    }
}
