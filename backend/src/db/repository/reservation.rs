//! Reservation storage operations.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{NewReservation, Reservation, ReservationId, RoomId, StayWindow};

/// Constraint a reservation insert violates when its room does not exist.
pub const ROOM_FOREIGN_KEY: &str = "reservations_room_id_fkey";
/// Constraint a reservation insert violates when its client does not exist.
pub const CLIENT_FOREIGN_KEY: &str = "reservations_client_id_fkey";

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Store a reservation. Fails with `ValidationError` naming
    /// [`ROOM_FOREIGN_KEY`] or [`CLIENT_FOREIGN_KEY`] when the room or the
    /// client it references does not exist.
    async fn insert_reservation(&self, reservation: &NewReservation)
        -> RepositoryResult<Reservation>;

    async fn get_reservation(&self, reservation_id: ReservationId)
        -> RepositoryResult<Reservation>;

    /// Remove a reservation for good, `NotFound` if it does not exist.
    async fn delete_reservation(&self, reservation_id: ReservationId) -> RepositoryResult<()>;

    /// Active reservations of `room_id` that conflict with `window` under
    /// [`StayWindow::conflicts_with`].
    async fn find_overlapping_reservations(
        &self,
        room_id: RoomId,
        window: &StayWindow,
    ) -> RepositoryResult<Vec<Reservation>>;

    /// Every reservation of a room, ordered by arrival date.
    async fn list_reservations_for_room(&self, room_id: RoomId)
        -> RepositoryResult<Vec<Reservation>>;
}
