use uuid::Uuid;
use wayline_core::booking::{BookingError, BookingStatusParseError};
use wayline_core::travel::TravelTypeParseError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Travel option not found: {0}")]
    OptionNotFound(Uuid),

    #[error("Booking not found: {0}")]
    BookingNotFound(Uuid),

    #[error("Insufficient seats: requested {requested}, available {available}")]
    InsufficientSeats { requested: i32, available: i32 },

    #[error("Username already taken: {0}")]
    UsernameTaken(String),

    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Booking(#[from] BookingError),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<TravelTypeParseError> for StoreError {
    fn from(err: TravelTypeParseError) -> Self {
        StoreError::Corrupt(err.to_string())
    }
}

impl From<BookingStatusParseError> for StoreError {
    fn from(err: BookingStatusParseError) -> Self {
        StoreError::Corrupt(err.to_string())
    }
}
