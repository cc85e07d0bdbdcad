//! Per-room booking locks.
//!
//! Creating a reservation reads the room's bookings, checks for overlap and
//! then inserts. [`RoomLocks`] serializes that sequence per room inside one
//! process so two requests for the same room cannot both pass the check.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::models::RoomId;

/// Registry of one async mutex per room, created on first use.
#[derive(Clone, Default)]
pub struct RoomLocks {
    rooms: Arc<Mutex<HashMap<RoomId, Arc<AsyncMutex<()>>>>>,
}

impl RoomLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `room`. Access ends when the guard drops.
    pub async fn acquire(&self, room: RoomId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut rooms = self.rooms.lock();
            Arc::clone(rooms.entry(room).or_default())
        };
        lock.lock_owned().await
    }

    /// Drop the lock entry of a deleted room.
    pub fn forget(&self, room: RoomId) {
        self.rooms.lock().remove(&room);
    }

    /// Number of rooms with a lock entry.
    pub fn len(&self) -> usize {
        self.rooms.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for RoomLocks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomLocks").field("rooms", &self.len()).finish()
    }
}
