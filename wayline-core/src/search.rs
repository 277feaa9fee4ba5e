use crate::travel::TravelType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Catalog search criteria. Absent fields are not applied; supplied fields
/// combine with AND semantics. Source/destination match as case-insensitive
/// substrings, the date matches the departure date exactly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub travel_type: Option<TravelType>,
    pub source: Option<String>,
    pub destination: Option<String>,
    pub date: Option<NaiveDate>,
}
