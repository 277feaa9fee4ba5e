use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use wayline_core::{BookingStats, User};

use crate::error::AppError;
use crate::middleware::auth::CustomerClaims;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
struct RegisterResponse {
    username: String,
    message: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
struct AuthResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
struct ProfileResponse {
    user: User,
    stats: BookingStats,
}

#[derive(Debug, Serialize)]
struct UpdateProfileResponse {
    user: User,
    message: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register/", post(register))
        .route("/login/", post(login))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/profile/", get(profile).post(update_profile))
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    if req.username.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::ValidationError(
            "Username and password are required".to_string(),
        ));
    }

    let user = state
        .users
        .create(req.username.trim(), &req.email, &req.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: format!("Account created for {}! You can now log in.", user.username),
            username: user.username,
        }),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = state.users.verify(&req.username, &req.password).await?;

    let claims = CustomerClaims {
        sub: user.id.to_string(),
        username: user.username,
        role: "CUSTOMER".to_owned(),
        exp: (Utc::now() + Duration::seconds(state.auth.expiration as i64)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.auth.secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))?;

    Ok(Json(AuthResponse { token }))
}

async fn profile(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
) -> Result<Json<ProfileResponse>, AppError> {
    let user_id = claims.user_id()?;
    let user = state.users.get(user_id).await?;
    let stats = state.bookings.stats_for_user(user_id).await?;

    Ok(Json(ProfileResponse { user, stats }))
}

async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UpdateProfileResponse>, AppError> {
    if req.username.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Username must not be empty".to_string(),
        ));
    }

    let user_id = claims.user_id()?;
    let user = state
        .users
        .update_profile(user_id, req.username.trim(), &req.email)
        .await?;

    Ok(Json(UpdateProfileResponse {
        user,
        message: "Your profile has been updated!".to_string(),
    }))
}
