use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::client::ClientId;
use super::room::RoomId;
use super::stay::StayWindow;

crate::define_id_type!(i64, ReservationId);

/// Booking state of a reservation.
///
/// Cancelling through the API removes the row entirely, so stores normally
/// only hold `Confirmed` reservations. `Cancelled` rows, when present, never
/// block a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Confirmed,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Unknown reservation status: {}", s)),
        }
    }
}

/// A stored reservation of one room by one client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub client_id: ClientId,
    pub room_id: RoomId,
    pub window: StayWindow,
    pub status: ReservationStatus,
}

impl Reservation {
    /// Whether this reservation still holds its room.
    pub fn is_active(&self) -> bool {
        self.status != ReservationStatus::Cancelled
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReservation {
    pub client_id: ClientId,
    pub room_id: RoomId,
    pub window: StayWindow,
    pub status: ReservationStatus,
}

impl NewReservation {
    /// A confirmed booking, the only kind the booking flow creates.
    pub fn confirmed(client_id: ClientId, room_id: RoomId, window: StayWindow) -> Self {
        Self {
            client_id,
            room_id,
            window,
            status: ReservationStatus::Confirmed,
        }
    }

    pub fn into_reservation(self, id: ReservationId) -> Reservation {
        Reservation {
            id,
            client_id: self.client_id,
            room_id: self.room_id,
            window: self.window,
            status: self.status,
        }
    }
}
