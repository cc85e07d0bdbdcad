//! Input checks shared by the domain operations.

use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer};

use super::error::{ServiceError, ServiceResult};
use super::messages;
use crate::models::{parse_date, StayWindow};

/// Unwrap a required field, failing with the field's wire name.
pub fn require<T>(value: Option<T>, field: &str) -> ServiceResult<T> {
    value.ok_or_else(|| ServiceError::validation(messages::missing_field(field)))
}

/// Parse a `YYYY-MM-DD` date from the wire.
pub fn parse_day(value: &str) -> ServiceResult<NaiveDate> {
    parse_date(value.trim()).map_err(|_| ServiceError::validation(messages::INVALID_DATE_FORMAT))
}

/// Parse both dates of a stay. Format errors win over ordering errors.
pub fn parse_stay_window(arrival: &str, departure: &str) -> ServiceResult<StayWindow> {
    let arrival = parse_day(arrival)?;
    let departure = parse_day(departure)?;
    StayWindow::checked(arrival, departure)
        .ok_or_else(|| ServiceError::validation(messages::DEPARTURE_NOT_AFTER_ARRIVAL))
}

/// Prices are finite and never negative.
pub fn validate_price(price: f64) -> ServiceResult<f64> {
    if price.is_finite() && price >= 0.0 {
        Ok(price)
    } else {
        Err(ServiceError::validation(messages::INVALID_PRICE))
    }
}

/// Deserialize an optional label that clients send either as a string or as
/// a bare number (`"101"` and `101` are the same room number).
pub fn lenient_label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Label {
        Text(String),
        Integer(i64),
        Decimal(f64),
    }

    Ok(match Option::<Label>::deserialize(deserializer)? {
        None => None,
        Some(Label::Text(s)) => Some(s),
        Some(Label::Integer(n)) => Some(n.to_string()),
        Some(Label::Decimal(n)) if n.is_finite() => Some(n.to_string()),
        Some(Label::Decimal(_)) => {
            return Err(de::Error::custom("expected a string or a number"));
        }
    })
}
