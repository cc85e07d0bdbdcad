use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Wire format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
}

/// The `[arrival, departure)` nights a reservation occupies, or the window a
/// guest asks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StayWindow {
    pub arrival: NaiveDate,
    pub departure: NaiveDate,
}

impl StayWindow {
    pub fn new(arrival: NaiveDate, departure: NaiveDate) -> Self {
        Self { arrival, departure }
    }

    /// Build a window only if departure falls strictly after arrival.
    pub fn checked(arrival: NaiveDate, departure: NaiveDate) -> Option<Self> {
        (arrival < departure).then_some(Self { arrival, departure })
    }

    /// Number of nights covered.
    pub fn nights(&self) -> i64 {
        (self.departure - self.arrival).num_days()
    }

    /// Whether an existing booking leaves this window free.
    ///
    /// A booking is clear when its arrival and its departure each fall on or
    /// outside the window bounds. Touching bounds count as clear, and so does
    /// a booking that starts before and ends after the whole window.
    pub fn is_clear_of(&self, booked: &StayWindow) -> bool {
        let arrival_outside = booked.arrival <= self.arrival || booked.arrival >= self.departure;
        let departure_outside =
            booked.departure <= self.arrival || booked.departure >= self.departure;
        arrival_outside && departure_outside
    }

    /// Whether an existing booking blocks this window. Negation of
    /// [`StayWindow::is_clear_of`].
    pub fn conflicts_with(&self, booked: &StayWindow) -> bool {
        !self.is_clear_of(booked)
    }
}
