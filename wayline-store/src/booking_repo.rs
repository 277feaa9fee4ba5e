use crate::catalog_repo::{TravelOptionRow, SELECT_OPTION};
use crate::error::StoreError;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;
use wayline_core::{Booking, BookingStats, BookingStatus, CancelOutcome, TravelOption};

/// The booking ledger. Every operation that touches `available_seats` runs
/// inside one transaction, with the decrement conditional on the row's
/// current value, so the count cannot go negative under concurrent requests.
#[derive(Clone)]
pub struct BookingRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    user_id: Uuid,
    travel_option_id: Uuid,
    number_of_seats: i32,
    unit_price_cents: i64,
    total_price_cents: i64,
    booking_date: DateTime<Utc>,
    status: String,
}

impl BookingRow {
    fn into_domain(self) -> Result<Booking, StoreError> {
        Ok(Booking {
            id: self.id,
            user_id: self.user_id,
            travel_option_id: self.travel_option_id,
            number_of_seats: self.number_of_seats,
            unit_price_cents: self.unit_price_cents,
            total_price_cents: self.total_price_cents,
            booking_date: self.booking_date,
            status: self.status.parse()?,
        })
    }
}

const BOOKING_COLUMNS: &str = "id, user_id, travel_option_id, number_of_seats, \
     unit_price_cents, total_price_cents, booking_date, status";

impl BookingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a Confirmed booking, snapshotting the option's unit price and
    /// decrementing its seat count. A request racing another booking for the
    /// last seats loses with `InsufficientSeats` instead of overselling.
    pub async fn create(
        &self,
        user_id: Uuid,
        option_id: Uuid,
        number_of_seats: i32,
    ) -> Result<Booking, StoreError> {
        let mut tx = self.pool.begin().await?;

        // 1. Load the option; an absent id is not-found, not a seat problem
        let option: TravelOption = sqlx::query_as::<_, TravelOptionRow>(SELECT_OPTION)
            .bind(option_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::OptionNotFound(option_id))?
            .into_domain()?;

        let booking = Booking::new(user_id, &option, number_of_seats)?;

        // 2. Conditional decrement; zero rows affected means the seats went away
        let updated = sqlx::query(
            "UPDATE travel_options SET available_seats = available_seats - ?1 \
             WHERE id = ?2 AND available_seats >= ?1",
        )
        .bind(number_of_seats)
        .bind(option_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(StoreError::InsufficientSeats {
                requested: number_of_seats,
                available: option.available_seats,
            });
        }

        // 3. Persist the booking with its price snapshot
        sqlx::query(
            "INSERT INTO bookings \
                 (id, user_id, travel_option_id, number_of_seats, unit_price_cents, \
                  total_price_cents, booking_date, status) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(booking.id)
        .bind(booking.user_id)
        .bind(booking.travel_option_id)
        .bind(booking.number_of_seats)
        .bind(booking.unit_price_cents)
        .bind(booking.total_price_cents)
        .bind(booking.booking_date)
        .bind(booking.status.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(booking_id = %booking.id, seats = number_of_seats, "Booking confirmed");
        Ok(booking)
    }

    /// Cancel an owned booking. A Confirmed booking returns its seats to the
    /// option and flips to Cancelled; one that is already Cancelled is left
    /// untouched and reported as `AlreadyCancelled`.
    pub async fn cancel(
        &self,
        booking_id: Uuid,
        user_id: Uuid,
    ) -> Result<(CancelOutcome, Booking), StoreError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1 AND user_id = ?2");
        let mut booking = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(booking_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::BookingNotFound(booking_id))?
            .into_domain()?;

        if booking.status == BookingStatus::Cancelled {
            return Ok((CancelOutcome::AlreadyCancelled, booking));
        }

        // Return the seats to the option
        sqlx::query(
            "UPDATE travel_options SET available_seats = available_seats + ?1 WHERE id = ?2",
        )
        .bind(booking.number_of_seats)
        .bind(booking.travel_option_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE bookings SET status = ?1 WHERE id = ?2")
            .bind(BookingStatus::Cancelled.as_str())
            .bind(booking_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        booking.status = BookingStatus::Cancelled;
        info!(booking_id = %booking.id, "Booking cancelled");
        Ok((CancelOutcome::Cancelled, booking))
    }

    /// Caller's bookings, newest first
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Booking>, StoreError> {
        let sql = format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE user_id = ?1 ORDER BY booking_date DESC"
        );
        let rows = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(BookingRow::into_domain).collect()
    }

    /// Owner-scoped fetch with the referenced travel option. Absent and
    /// not-owned bookings are indistinguishable from the caller's side.
    pub async fn get_for_user(
        &self,
        booking_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<(Booking, TravelOption)>, StoreError> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1 AND user_id = ?2");
        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(booking_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let booking = row.into_domain()?;

        let option = sqlx::query_as::<_, TravelOptionRow>(SELECT_OPTION)
            .bind(booking.travel_option_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                StoreError::Corrupt(format!(
                    "Booking {} references missing travel option {}",
                    booking.id, booking.travel_option_id
                ))
            })?
            .into_domain()?;

        Ok(Some((booking, option)))
    }

    /// Total / confirmed / cancelled counters for the profile view
    pub async fn stats_for_user(&self, user_id: Uuid) -> Result<BookingStats, StoreError> {
        let (total, confirmed, cancelled): (i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), \
                    COALESCE(SUM(status = ?2), 0), \
                    COALESCE(SUM(status = ?3), 0) \
             FROM bookings WHERE user_id = ?1",
        )
        .bind(user_id)
        .bind(BookingStatus::Confirmed.as_str())
        .bind(BookingStatus::Cancelled.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(BookingStats {
            total,
            confirmed,
            cancelled,
        })
    }
}
