use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

use super::schema::{clients, reservations, rooms};
use crate::db::repository::{ErrorContext, RepositoryError, RepositoryResult};
use crate::models::{
    Client, ClientId, NewClient, NewReservation, NewRoom, Reservation, ReservationId,
    ReservationStatus, Room, RoomId, StayWindow,
};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = clients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)] // created_at is only kept for auditing in SQL
pub struct ClientRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = clients)]
pub struct NewClientRow {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = rooms)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)]
pub struct RoomRow {
    pub id: i64,
    pub number: String,
    pub room_type: String,
    pub price: f64,
    pub created_at: DateTime<Utc>,
}

/// Insert payload and wholesale update changeset for rooms.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = rooms)]
pub struct RoomValuesRow {
    pub number: String,
    pub room_type: String,
    pub price: f64,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reservations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)]
pub struct ReservationRow {
    pub id: i64,
    pub client_id: i64,
    pub room_id: i64,
    pub arrival_date: NaiveDate,
    pub departure_date: NaiveDate,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reservations)]
pub struct NewReservationRow {
    pub client_id: i64,
    pub room_id: i64,
    pub arrival_date: NaiveDate,
    pub departure_date: NaiveDate,
    pub status: String,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Client {
            id: ClientId(row.id),
            name: row.name,
            email: row.email,
        }
    }
}

impl From<&NewClient> for NewClientRow {
    fn from(client: &NewClient) -> Self {
        Self {
            name: client.name.clone(),
            email: client.email.clone(),
        }
    }
}

impl From<RoomRow> for Room {
    fn from(row: RoomRow) -> Self {
        Room {
            id: RoomId(row.id),
            number: row.number,
            room_type: row.room_type,
            price: row.price,
        }
    }
}

impl From<&NewRoom> for RoomValuesRow {
    fn from(room: &NewRoom) -> Self {
        Self {
            number: room.number.clone(),
            room_type: room.room_type.clone(),
            price: room.price,
        }
    }
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = RepositoryError;

    fn try_from(row: ReservationRow) -> RepositoryResult<Self> {
        let status: ReservationStatus = row.status.parse().map_err(|e: String| {
            RepositoryError::internal_with_context(
                e,
                ErrorContext::new("decode_reservation")
                    .with_entity("reservation")
                    .with_entity_id(row.id),
            )
        })?;

        Ok(Reservation {
            id: ReservationId(row.id),
            client_id: ClientId(row.client_id),
            room_id: RoomId(row.room_id),
            window: StayWindow::new(row.arrival_date, row.departure_date),
            status,
        })
    }
}

impl From<&NewReservation> for NewReservationRow {
    fn from(reservation: &NewReservation) -> Self {
        Self {
            client_id: reservation.client_id.value(),
            room_id: reservation.room_id.value(),
            arrival_date: reservation.window.arrival,
            departure_date: reservation.window.departure,
            status: reservation.status.as_str().to_string(),
        }
    }
}

pub fn rows_to_reservations(rows: Vec<ReservationRow>) -> RepositoryResult<Vec<Reservation>> {
    rows.into_iter().map(Reservation::try_from).collect()
}
