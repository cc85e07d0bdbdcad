//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::repository::FullRepository;
use crate::services::RoomLocks;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Store behind every operation
    pub repository: Arc<dyn FullRepository>,
    /// Serializes bookings per room
    pub room_locks: RoomLocks,
}

impl AppState {
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self {
            repository,
            room_locks: RoomLocks::new(),
        }
    }
}
