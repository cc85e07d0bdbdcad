//! # Hotel Reservation Backend
//!
//! Rooms, clients and reservations behind a JSON REST API.
//!
//! The only real rule of the domain is the date overlap test: a room can be
//! booked for a stay only when none of its active reservations blocks that
//! stay (see [`models::StayWindow`]). The same test drives the availability
//! search and the validation of new bookings.
//!
//! ## Architecture
//!
//! - [`models`]: Ids, entities and the stay window with its overlap predicate
//! - [`db`]: Repository traits, in-memory and Postgres stores, store selection
//! - [`services`]: Domain operations, validation and per-room booking locks
//! - [`http`]: Axum-based HTTP server and request handlers
//! - [`config`]: Server settings

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod config;
pub mod db;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
