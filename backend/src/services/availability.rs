//! Availability search.

use serde::Deserialize;

use super::error::{ServiceError, ServiceResult};
use super::messages;
use super::validation::parse_stay_window;
use crate::db::repository::FullRepository;
use crate::models::Room;

/// Query string of the availability search. Both dates are `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvailabilityQuery {
    pub date_arrivee: Option<String>,
    pub date_depart: Option<String>,
}

impl AvailabilityQuery {
    pub fn new(arrival: impl Into<String>, departure: impl Into<String>) -> Self {
        Self {
            date_arrivee: Some(arrival.into()),
            date_depart: Some(departure.into()),
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Rooms with no active reservation blocking the requested window, by id.
pub async fn search_available_rooms<R>(repo: &R, query: &AvailabilityQuery) -> ServiceResult<Vec<Room>>
where
    R: FullRepository + ?Sized,
{
    let (Some(arrival), Some(departure)) = (present(&query.date_arrivee), present(&query.date_depart))
    else {
        return Err(ServiceError::validation(messages::DATES_REQUIRED));
    };
    let window = parse_stay_window(arrival, departure)?;

    let rooms = repo.list_available_rooms(&window).await?;
    log::debug!(
        "{} room(s) available from {} to {}",
        rooms.len(),
        window.arrival,
        window.departure
    );
    Ok(rooms)
}
