use axum::http::Method;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod assistant;
pub mod auth;
pub mod bookings;
pub mod catalog;
pub mod error;
pub mod middleware;
pub mod state;

pub use state::{AppState, AuthConfig};

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    // Booking and profile routes require a customer token
    let protected = Router::new()
        .merge(bookings::routes())
        .merge(auth::protected_routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::customer_auth_middleware,
        ));

    Router::new()
        .merge(catalog::routes())
        .merge(auth::routes())
        .merge(assistant::routes())
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
