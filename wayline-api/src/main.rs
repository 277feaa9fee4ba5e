use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wayline_api::{app, AppState, AuthConfig};
use wayline_assistant::ResponseEngine;
use wayline_store::{BookingRepository, CatalogRepository, DbClient, UserRepository};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wayline_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = wayline_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Wayline API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to open database");
    db.migrate().await.expect("Failed to run migrations");

    let state = AppState {
        catalog: CatalogRepository::new(db.pool.clone()),
        bookings: BookingRepository::new(db.pool.clone()),
        users: UserRepository::new(db.pool.clone()),
        assistant: Arc::new(ResponseEngine::with_default_rules()),
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
        home_page_size: config.catalog.home_page_size,
    };

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
