use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use wayline_core::{SearchCriteria, TravelOption};

use crate::error::AppError;
use crate::state::AppState;

/// Raw query parameters. Empty strings count as "not supplied", matching how
/// the search form submits untouched fields.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    travel_type: Option<String>,
    source: Option<String>,
    destination: Option<String>,
    date: Option<String>,
}

impl SearchParams {
    fn into_criteria(self) -> Result<SearchCriteria, AppError> {
        let travel_type = match non_empty(self.travel_type) {
            Some(raw) => Some(raw.parse().map_err(|_| {
                AppError::ValidationError(format!("Unknown travel type: {}", raw))
            })?),
            None => None,
        };

        let date = match non_empty(self.date) {
            Some(raw) => Some(NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
                AppError::ValidationError(format!("Invalid date (expected YYYY-MM-DD): {}", raw))
            })?),
            None => None,
        };

        Ok(SearchCriteria {
            travel_type,
            source: non_empty(self.source),
            destination: non_empty(self.destination),
            date,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/travel/", get(travel_list))
}

/// GET / — the soonest-departing catalog entries, filterable
async fn home(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<TravelOption>>, AppError> {
    let criteria = params.into_criteria()?;
    let options = state
        .catalog
        .search(&criteria, Some(state.home_page_size))
        .await?;

    Ok(Json(options))
}

/// GET /travel/ — the full filtered catalog
async fn travel_list(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<TravelOption>>, AppError> {
    let criteria = params.into_criteria()?;
    let options = state.catalog.search(&criteria, None).await?;

    Ok(Json(options))
}
