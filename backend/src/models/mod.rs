//! Domain models for the hotel: clients, rooms, reservations and the stay
//! windows reservations occupy.

pub mod client;
pub mod macros;
pub mod reservation;
pub mod room;
pub mod stay;

pub use client::*;
pub use reservation::*;
pub use room::*;
pub use stay::*;
