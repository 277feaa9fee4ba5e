use std::sync::Arc;
use wayline_assistant::ResponseEngine;
use wayline_store::{BookingRepository, CatalogRepository, UserRepository};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogRepository,
    pub bookings: BookingRepository,
    pub users: UserRepository,
    pub assistant: Arc<ResponseEngine>,
    pub auth: AuthConfig,
    pub home_page_size: i64,
}
