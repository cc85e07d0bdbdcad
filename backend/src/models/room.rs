use serde::{Deserialize, Serialize};

crate::define_id_type!(i64, RoomId);

/// A bookable room. The room number is unique across all rooms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub number: String,
    pub room_type: String,
    /// Nightly price, never negative.
    pub price: f64,
}

/// Room attributes without an id. Used both for inserts and for wholesale
/// updates of an existing room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRoom {
    pub number: String,
    pub room_type: String,
    pub price: f64,
}

impl NewRoom {
    pub fn new(number: impl Into<String>, room_type: impl Into<String>, price: f64) -> Self {
        Self {
            number: number.into(),
            room_type: room_type.into(),
            price,
        }
    }

    pub fn into_room(self, id: RoomId) -> Room {
        Room {
            id,
            number: self.number,
            room_type: self.room_type,
            price: self.price,
        }
    }
}
