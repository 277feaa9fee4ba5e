use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wayline_core::{Booking, BookingStatus, CancelOutcome, TravelOption};

use crate::error::AppError;
use crate::middleware::auth::CustomerClaims;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub number_of_seats: i32,
}

#[derive(Debug, Serialize)]
struct CreateBookingResponse {
    booking: Booking,
    message: String,
}

#[derive(Debug, Serialize)]
struct BookingDetailResponse {
    booking: Booking,
    travel_option: TravelOption,
    duration_hours: i64,
    duration_minutes: i64,
}

#[derive(Debug, Serialize)]
struct CancelBookingResponse {
    booking_id: Uuid,
    status: BookingStatus,
    already_cancelled: bool,
    message: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/booking/{option_id}/", post(create_booking))
        .route("/bookings/", get(list_bookings))
        .route("/bookings/{booking_id}/", get(booking_detail))
        .route("/bookings/{booking_id}/cancel/", post(cancel_booking))
}

/// POST /booking/{option_id}/
async fn create_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path(option_id): Path<Uuid>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<CreateBookingResponse>), AppError> {
    let user_id = claims.user_id()?;

    let booking = state
        .bookings
        .create(user_id, option_id, req.number_of_seats)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateBookingResponse {
            booking,
            message: "Booking confirmed successfully!".to_string(),
        }),
    ))
}

/// GET /bookings/ — the caller's bookings, newest first
async fn list_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let user_id = claims.user_id()?;
    let bookings = state.bookings.list_for_user(user_id).await?;

    Ok(Json(bookings))
}

/// GET /bookings/{booking_id}/ — owner-scoped detail with travel duration
async fn booking_detail(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingDetailResponse>, AppError> {
    let user_id = claims.user_id()?;

    let (booking, travel_option) = state
        .bookings
        .get_for_user(booking_id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("Booking not found: {}", booking_id)))?;

    let duration = travel_option.duration();

    Ok(Json(BookingDetailResponse {
        booking,
        duration_hours: duration.num_hours(),
        duration_minutes: duration.num_minutes() % 60,
        travel_option,
    }))
}

/// POST /bookings/{booking_id}/cancel/ — idempotent after the first cancel;
/// the response says which case the caller hit
async fn cancel_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<CancelBookingResponse>, AppError> {
    let user_id = claims.user_id()?;

    let (outcome, booking) = state.bookings.cancel(booking_id, user_id).await?;
    let (already_cancelled, message) = match outcome {
        CancelOutcome::Cancelled => (false, "Booking cancelled successfully!"),
        CancelOutcome::AlreadyCancelled => (true, "Booking is already cancelled."),
    };

    Ok(Json(CancelBookingResponse {
        booking_id: booking.id,
        status: booking.status,
        already_cancelled,
        message: message.to_string(),
    }))
}
