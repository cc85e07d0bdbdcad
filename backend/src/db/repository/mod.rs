//! Repository trait definitions for hotel persistence.
//!
//! Storage is split into one focused trait per entity so implementations
//! and test doubles stay small:
//!
//! - [`ClientRepository`]: client registration and lookup by email
//! - [`RoomRepository`]: room CRUD and the availability query
//! - [`ReservationRepository`]: bookings and the per-room overlap query
//!
//! Services take the [`FullRepository`] bound, which every type implementing
//! all three traits gets for free.

pub mod client;
pub mod error;
pub mod reservation;
pub mod room;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

pub use client::ClientRepository;
pub use reservation::{ReservationRepository, CLIENT_FOREIGN_KEY, ROOM_FOREIGN_KEY};
pub use room::RoomRepository;

/// Composite trait bound for a complete repository implementation.
pub trait FullRepository: ClientRepository + RoomRepository + ReservationRepository {}

impl<T> FullRepository for T where T: ClientRepository + RoomRepository + ReservationRepository {}
