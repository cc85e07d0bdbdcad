//! Room storage operations, including the availability query.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{NewRoom, Room, RoomId, StayWindow};

/// Repository trait for rooms.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait RoomRepository: Send + Sync {
    // ==================== Health & Connection ====================

    /// Check if the store is reachable.
    ///
    /// # Returns
    /// - `Ok(true)` if connection is healthy
    /// - `Ok(false)` if connection is unhealthy but no error occurred
    /// - `Err(RepositoryError)` if an error occurred during the check
    async fn health_check(&self) -> RepositoryResult<bool>;

    // ==================== Room Operations ====================

    /// Store a new room.
    ///
    /// # Returns
    /// * `Ok(Room)` - The stored room including its assigned ID
    /// * `Err(RepositoryError::ConflictError)` - If the room number is taken
    async fn insert_room(&self, room: &NewRoom) -> RepositoryResult<Room>;

    /// Fetch a room by id.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the room doesn't exist
    async fn get_room(&self, room_id: RoomId) -> RepositoryResult<Room>;

    /// Look a room up by its number.
    async fn find_room_by_number(&self, number: &str) -> RepositoryResult<Option<Room>>;

    /// Replace number, type and price of an existing room.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the room doesn't exist
    /// * `Err(RepositoryError::ConflictError)` - If another room already uses the number
    async fn update_room(&self, room_id: RoomId, room: &NewRoom) -> RepositoryResult<Room>;

    /// Delete a room together with every reservation that references it.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the room doesn't exist
    async fn delete_room(&self, room_id: RoomId) -> RepositoryResult<()>;

    /// All rooms ordered by id.
    async fn list_rooms(&self) -> RepositoryResult<Vec<Room>>;

    // ==================== Availability ====================

    /// Rooms with no active reservation conflicting with `window`, ordered by id.
    ///
    /// Conflicts are decided by [`StayWindow::conflicts_with`]; cancelled
    /// reservations are ignored.
    async fn list_available_rooms(&self, window: &StayWindow) -> RepositoryResult<Vec<Room>>;
}
