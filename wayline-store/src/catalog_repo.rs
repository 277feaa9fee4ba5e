use crate::error::StoreError;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;
use wayline_core::{SearchCriteria, TravelOption};

#[derive(Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
pub(crate) struct TravelOptionRow {
    pub(crate) id: Uuid,
    pub(crate) travel_type: String,
    pub(crate) source: String,
    pub(crate) destination: String,
    pub(crate) departure_time: DateTime<Utc>,
    pub(crate) arrival_time: DateTime<Utc>,
    pub(crate) price_cents: i64,
    pub(crate) available_seats: i32,
}

impl TravelOptionRow {
    pub(crate) fn into_domain(self) -> Result<TravelOption, StoreError> {
        Ok(TravelOption {
            id: self.id,
            travel_type: self.travel_type.parse()?,
            source: self.source,
            destination: self.destination,
            departure_time: self.departure_time,
            arrival_time: self.arrival_time,
            price_cents: self.price_cents,
            available_seats: self.available_seats,
        })
    }
}

pub(crate) const SELECT_OPTION: &str = "SELECT id, travel_type, source, destination, \
     departure_time, arrival_time, price_cents, available_seats \
     FROM travel_options WHERE id = ?1";

impl CatalogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a catalog entry. Catalog authoring has no public HTTP surface;
    /// this is used by seeding and tests.
    pub async fn insert(&self, option: &TravelOption) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO travel_options \
                 (id, travel_type, source, destination, departure_time, arrival_time, \
                  price_cents, available_seats) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(option.id)
        .bind(option.travel_type.as_str())
        .bind(&option.source)
        .bind(&option.destination)
        .bind(option.departure_time)
        .bind(option.arrival_time)
        .bind(option.price_cents)
        .bind(option.available_seats)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<TravelOption>, StoreError> {
        let row = sqlx::query_as::<_, TravelOptionRow>(SELECT_OPTION)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(TravelOptionRow::into_domain).transpose()
    }

    /// Filtered catalog listing, soonest departure first. Absent criteria
    /// are not applied; supplied ones combine with AND semantics. `limit`
    /// of None returns everything.
    pub async fn search(
        &self,
        criteria: &SearchCriteria,
        limit: Option<i64>,
    ) -> Result<Vec<TravelOption>, StoreError> {
        let rows = sqlx::query_as::<_, TravelOptionRow>(
            "SELECT id, travel_type, source, destination, departure_time, arrival_time, \
                    price_cents, available_seats \
             FROM travel_options \
             WHERE (?1 IS NULL OR travel_type = ?1) \
               AND (?2 IS NULL OR source LIKE '%' || ?2 || '%') \
               AND (?3 IS NULL OR destination LIKE '%' || ?3 || '%') \
               AND (?4 IS NULL OR date(departure_time) = ?4) \
             ORDER BY datetime(departure_time) ASC \
             LIMIT ?5",
        )
        .bind(criteria.travel_type.map(|t| t.as_str()))
        .bind(criteria.source.as_deref())
        .bind(criteria.destination.as_deref())
        .bind(criteria.date)
        .bind(limit.unwrap_or(-1))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(TravelOptionRow::into_domain)
            .collect()
    }
}
