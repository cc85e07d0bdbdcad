//! Domain operations of the hotel.
//!
//! Each operation takes the store it works against as an argument, so the
//! same code runs over [`LocalRepository`](crate::db::repositories::LocalRepository)
//! in tests and over Postgres in production. Operations validate their input,
//! consult the store and return either the affected entity or a
//! [`ServiceError`] whose message is ready to show to the caller.

pub mod availability;
pub mod clients;
pub mod error;
pub mod locks;
pub mod messages;
pub mod reservations;
pub mod rooms;
pub mod validation;

pub use availability::{search_available_rooms, AvailabilityQuery};
pub use clients::{add_client, ClientRequest};
pub use error::{ServiceError, ServiceResult};
pub use locks::RoomLocks;
pub use reservations::{cancel_reservation, create_reservation, ReservationRequest};
pub use rooms::{add_room, delete_room, update_room, RoomRequest};
