//! Reservation booking and cancellation.

use serde::Deserialize;

use super::error::{ServiceError, ServiceResult};
use super::locks::RoomLocks;
use super::messages;
use super::validation::{parse_stay_window, require};
use crate::db::repository::{
    FullRepository, RepositoryError, CLIENT_FOREIGN_KEY, ROOM_FOREIGN_KEY,
};
use crate::models::{ClientId, NewReservation, Reservation, ReservationId, RoomId};

/// Body of a booking request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReservationRequest {
    #[serde(rename = "id_client", default)]
    pub client_id: Option<i64>,
    #[serde(rename = "id_chambre", default)]
    pub room_id: Option<i64>,
    #[serde(rename = "date_arrivee", default)]
    pub arrival: Option<String>,
    #[serde(rename = "date_depart", default)]
    pub departure: Option<String>,
}

/// Book a room for a client.
///
/// Checks run in this order: required fields, date format, date order, room
/// existence, client existence, then overlap with the room's active bookings.
/// The overlap check and the insert happen under the room's lock.
pub async fn create_reservation<R>(
    repo: &R,
    locks: &RoomLocks,
    request: ReservationRequest,
) -> ServiceResult<Reservation>
where
    R: FullRepository + ?Sized,
{
    let client_id = ClientId(require(request.client_id, "id_client")?);
    let room_id = RoomId(require(request.room_id, "id_chambre")?);
    let arrival = require(request.arrival, "date_arrivee")?;
    let departure = require(request.departure, "date_depart")?;
    let window = parse_stay_window(&arrival, &departure)?;

    let room = repo
        .get_room(room_id)
        .await
        .map_err(|e| ServiceError::from_lookup(e, messages::ROOM_NOT_FOUND))?;
    repo.get_client(client_id)
        .await
        .map_err(|e| ServiceError::from_lookup(e, messages::CLIENT_NOT_FOUND))?;

    let _guard = locks.acquire(room.id).await;

    // The room may have been deleted while this request waited for the lock.
    repo.get_room(room.id)
        .await
        .map_err(|e| ServiceError::from_lookup(e, messages::ROOM_NOT_FOUND))?;

    let blocking = repo.find_overlapping_reservations(room.id, &window).await?;
    if !blocking.is_empty() {
        log::warn!(
            "Room {} already booked over {}..{} (reservation {})",
            room.number,
            window.arrival,
            window.departure,
            blocking[0].id
        );
        return Err(ServiceError::conflict(messages::ROOM_UNAVAILABLE));
    }

    let reservation = repo
        .insert_reservation(&NewReservation::confirmed(client_id, room.id, window))
        .await
        .map_err(insert_error)?;

    log::info!(
        "Reservation {} created: room {} for client {}, {} night(s) from {}",
        reservation.id,
        room.number,
        client_id,
        window.nights(),
        window.arrival
    );
    Ok(reservation)
}

/// A reservation insert that loses its room or client to a concurrent
/// delete reports the missing row, not a store failure.
fn insert_error(err: RepositoryError) -> ServiceError {
    if err.violates(ROOM_FOREIGN_KEY) {
        ServiceError::not_found(messages::ROOM_NOT_FOUND)
    } else if err.violates(CLIENT_FOREIGN_KEY) {
        ServiceError::not_found(messages::CLIENT_NOT_FOUND)
    } else {
        ServiceError::Repository(err)
    }
}

/// Remove a reservation, freeing its dates.
pub async fn cancel_reservation<R>(repo: &R, reservation_id: ReservationId) -> ServiceResult<()>
where
    R: FullRepository + ?Sized,
{
    repo.delete_reservation(reservation_id)
        .await
        .map_err(|e| ServiceError::from_lookup(e, messages::RESERVATION_NOT_FOUND))?;
    log::info!("Reservation {} cancelled", reservation_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use crate::db::repository::{ClientRepository, ReservationRepository, RoomRepository};
    use crate::models::{NewClient, NewRoom};

    struct Hotel {
        repo: LocalRepository,
        locks: RoomLocks,
        client: ClientId,
        room: RoomId,
    }

    async fn hotel() -> Hotel {
        let repo = LocalRepository::new();
        let client = repo
            .insert_client(&NewClient::new("Alice", "alice@example.com"))
            .await
            .unwrap();
        let room = repo.insert_room(&NewRoom::new("101", "double", 120.0)).await.unwrap();
        Hotel {
            repo,
            locks: RoomLocks::new(),
            client: client.id,
            room: room.id,
        }
    }

    fn request(client: ClientId, room: RoomId, arrival: &str, departure: &str) -> ReservationRequest {
        ReservationRequest {
            client_id: Some(client.value()),
            room_id: Some(room.value()),
            arrival: Some(arrival.to_string()),
            departure: Some(departure.to_string()),
        }
    }

    impl Hotel {
        async fn book(&self, arrival: &str, departure: &str) -> ServiceResult<Reservation> {
            create_reservation(
                &self.repo,
                &self.locks,
                request(self.client, self.room, arrival, departure),
            )
            .await
        }
    }

    #[tokio::test]
    async fn test_books_free_room() {
        let hotel = hotel().await;
        let reservation = hotel.book("2024-06-01", "2024-06-05").await.unwrap();
        assert_eq!(reservation.room_id, hotel.room);
        assert_eq!(reservation.client_id, hotel.client);
        assert!(reservation.is_active());
        assert_eq!(hotel.repo.reservation_count(), 1);
    }

    #[tokio::test]
    async fn test_overlap_is_rejected_and_not_stored() {
        let hotel = hotel().await;
        hotel.book("2024-06-01", "2024-06-05").await.unwrap();

        let err = hotel.book("2024-06-03", "2024-06-07").await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(ref m) if m == messages::ROOM_UNAVAILABLE));
        assert_eq!(hotel.repo.reservation_count(), 1);
    }

    #[tokio::test]
    async fn test_back_to_back_stays_are_allowed() {
        let hotel = hotel().await;
        hotel.book("2024-06-01", "2024-06-05").await.unwrap();
        hotel.book("2024-06-05", "2024-06-08").await.unwrap();
        hotel.book("2024-05-28", "2024-06-01").await.unwrap();
        assert_eq!(hotel.repo.reservation_count(), 3);
    }

    #[tokio::test]
    async fn test_missing_fields_in_order() {
        let hotel = hotel().await;
        let err = create_reservation(&hotel.repo, &hotel.locks, ReservationRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), messages::missing_field("id_client"));

        let mut partial = request(hotel.client, hotel.room, "2024-06-01", "2024-06-02");
        partial.departure = None;
        let err = create_reservation(&hotel.repo, &hotel.locks, partial)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), messages::missing_field("date_depart"));
    }

    #[tokio::test]
    async fn test_unknown_room_then_unknown_client() {
        let hotel = hotel().await;
        let err = create_reservation(
            &hotel.repo,
            &hotel.locks,
            request(ClientId(999), RoomId(999), "2024-06-01", "2024-06-02"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(ref m) if m == messages::ROOM_NOT_FOUND));

        let err = create_reservation(
            &hotel.repo,
            &hotel.locks,
            request(ClientId(999), hotel.room, "2024-06-01", "2024-06-02"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(ref m) if m == messages::CLIENT_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_reversed_dates_rejected() {
        let hotel = hotel().await;
        let err = hotel.book("2024-06-05", "2024-06-01").await.unwrap_err();
        assert_eq!(err.to_string(), messages::DEPARTURE_NOT_AFTER_ARRIVAL);
    }

    #[tokio::test]
    async fn test_cancel_frees_dates_and_second_cancel_is_not_found() {
        let hotel = hotel().await;
        let first = hotel.book("2024-06-01", "2024-06-05").await.unwrap();

        cancel_reservation(&hotel.repo, first.id).await.unwrap();
        assert!(hotel.repo.get_reservation(first.id).await.is_err());
        hotel.book("2024-06-03", "2024-06-07").await.unwrap();

        let err = cancel_reservation(&hotel.repo, first.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(ref m) if m == messages::RESERVATION_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_booking_queued_behind_room_delete_reports_missing_room() {
        let hotel = hotel().await;
        let held = hotel.locks.acquire(hotel.room).await;

        let (repo, locks, room) = (hotel.repo.clone(), hotel.locks.clone(), hotel.room);
        let deleting = tokio::spawn(async move {
            crate::services::delete_room(&repo, &locks, room).await
        });
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let (repo, locks, client) = (hotel.repo.clone(), hotel.locks.clone(), hotel.client);
        let booking = tokio::spawn(async move {
            create_reservation(
                &repo,
                &locks,
                request(client, room, "2024-06-01", "2024-06-05"),
            )
            .await
        });
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        drop(held);

        deleting.await.unwrap().unwrap();
        let err = booking.await.unwrap().unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(ref m) if m == messages::ROOM_NOT_FOUND));
        assert_eq!(hotel.repo.reservation_count(), 0);
    }

    #[test]
    fn test_foreign_key_violations_map_to_not_found() {
        use crate::db::repository::ErrorContext;

        let violation = |constraint: &str| {
            RepositoryError::validation_with_context(
                "insert or update on table \"reservations\" violates foreign key constraint",
                ErrorContext::new("insert_reservation")
                    .with_details(format!("db_error_kind=ForeignKeyViolation, constraint={}", constraint)),
            )
        };

        let err = insert_error(violation(ROOM_FOREIGN_KEY));
        assert!(matches!(err, ServiceError::NotFound(ref m) if m == messages::ROOM_NOT_FOUND));
        let err = insert_error(violation(CLIENT_FOREIGN_KEY));
        assert!(matches!(err, ServiceError::NotFound(ref m) if m == messages::CLIENT_NOT_FOUND));
        let err = insert_error(RepositoryError::query("syntax error"));
        assert!(matches!(err, ServiceError::Repository(_)));
    }

    #[tokio::test]
    async fn test_store_failure_is_repository_error() {
        let hotel = hotel().await;
        hotel.repo.set_healthy(false);
        let err = hotel.book("2024-06-01", "2024-06-05").await.unwrap_err();
        assert!(matches!(err, ServiceError::Repository(_)));
    }
}
