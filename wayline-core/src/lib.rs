pub mod booking;
pub mod identity;
pub mod search;
pub mod travel;

pub use booking::{Booking, BookingError, BookingStats, BookingStatus, CancelOutcome};
pub use identity::User;
pub use search::SearchCriteria;
pub use travel::{TravelOption, TravelType};
