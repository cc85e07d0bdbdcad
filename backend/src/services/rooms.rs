//! Room management: add, update, delete.

use serde::Deserialize;

use super::error::{ServiceError, ServiceResult};
use super::locks::RoomLocks;
use super::messages;
use super::validation::{lenient_label, require, validate_price};
use crate::db::repository::FullRepository;
use crate::models::{NewRoom, Room, RoomId};

/// Body of a room create or update request. Updates replace all three fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoomRequest {
    #[serde(rename = "numero", default, deserialize_with = "lenient_label")]
    pub number: Option<String>,
    #[serde(rename = "type", default)]
    pub room_type: Option<String>,
    #[serde(rename = "prix", default)]
    pub price: Option<f64>,
}

impl RoomRequest {
    pub fn new(number: impl Into<String>, room_type: impl Into<String>, price: f64) -> Self {
        Self {
            number: Some(number.into()),
            room_type: Some(room_type.into()),
            price: Some(price),
        }
    }

    /// Check required fields in wire order, then the price.
    pub fn into_new_room(self) -> ServiceResult<NewRoom> {
        let number = require(self.number, "numero")?;
        let room_type = require(self.room_type, "type")?;
        let price = validate_price(require(self.price, "prix")?)?;
        Ok(NewRoom::new(number, room_type, price))
    }
}

/// Fail if `number` belongs to a room other than `except`.
async fn ensure_number_free<R>(repo: &R, number: &str, except: Option<RoomId>) -> ServiceResult<()>
where
    R: FullRepository + ?Sized,
{
    match repo.find_room_by_number(number).await? {
        Some(existing) if Some(existing.id) != except => {
            Err(ServiceError::conflict(messages::ROOM_NUMBER_TAKEN))
        }
        _ => Ok(()),
    }
}

pub async fn add_room<R>(repo: &R, request: RoomRequest) -> ServiceResult<Room>
where
    R: FullRepository + ?Sized,
{
    let new_room = request.into_new_room()?;
    ensure_number_free(repo, &new_room.number, None).await?;

    let room = repo
        .insert_room(&new_room)
        .await
        .map_err(|e| ServiceError::from_write(e, messages::ROOM_NUMBER_TAKEN))?;
    log::info!("Room {} added as {} ({})", room.number, room.id, room.room_type);
    Ok(room)
}

/// Replace a room's number, type and price. An unknown id is reported before
/// any field problem.
pub async fn update_room<R>(repo: &R, room_id: RoomId, request: RoomRequest) -> ServiceResult<Room>
where
    R: FullRepository + ?Sized,
{
    repo.get_room(room_id)
        .await
        .map_err(|e| ServiceError::from_lookup(e, messages::ROOM_NOT_FOUND))?;

    let values = request.into_new_room()?;
    ensure_number_free(repo, &values.number, Some(room_id)).await?;

    let room = repo.update_room(room_id, &values).await.map_err(|e| {
        if e.is_not_found() {
            ServiceError::not_found(messages::ROOM_NOT_FOUND)
        } else {
            ServiceError::from_write(e, messages::ROOM_NUMBER_TAKEN)
        }
    })?;
    log::info!("Room {} updated", room.id);
    Ok(room)
}

/// Delete a room together with its reservations.
pub async fn delete_room<R>(repo: &R, locks: &RoomLocks, room_id: RoomId) -> ServiceResult<()>
where
    R: FullRepository + ?Sized,
{
    {
        let _guard = locks.acquire(room_id).await;
        repo.delete_room(room_id)
            .await
            .map_err(|e| ServiceError::from_lookup(e, messages::ROOM_NOT_FOUND))?;
    }
    locks.forget(room_id);
    log::info!("Room {} deleted", room_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use crate::db::repository::{ClientRepository, ReservationRepository, RoomRepository};
    use crate::models::{parse_date, NewClient, NewReservation, StayWindow};

    #[tokio::test]
    async fn test_add_room() {
        let repo = LocalRepository::new();
        let room = add_room(&repo, RoomRequest::new("101", "double", 120.0))
            .await
            .unwrap();
        assert_eq!(room.number, "101");
        assert_eq!(repo.get_room(room.id).await.unwrap(), room);
    }

    #[tokio::test]
    async fn test_add_room_requires_price() {
        let repo = LocalRepository::new();
        let request = RoomRequest {
            price: None,
            ..RoomRequest::new("101", "double", 0.0)
        };
        let err = add_room(&repo, request).await.unwrap_err();
        assert_eq!(err.to_string(), messages::missing_field("prix"));
        assert_eq!(repo.room_count(), 0);
    }

    #[tokio::test]
    async fn test_add_room_rejects_negative_price() {
        let repo = LocalRepository::new();
        let err = add_room(&repo, RoomRequest::new("101", "double", -5.0))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), messages::INVALID_PRICE);
    }

    #[tokio::test]
    async fn test_duplicate_number_is_conflict() {
        let repo = LocalRepository::new();
        add_room(&repo, RoomRequest::new("101", "double", 120.0)).await.unwrap();
        let err = add_room(&repo, RoomRequest::new("101", "suite", 300.0))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(ref m) if m == messages::ROOM_NUMBER_TAKEN));
        assert_eq!(repo.room_count(), 1);
    }

    #[tokio::test]
    async fn test_update_replaces_fields_and_keeps_own_number() {
        let repo = LocalRepository::new();
        let room = add_room(&repo, RoomRequest::new("101", "double", 120.0)).await.unwrap();

        let updated = update_room(&repo, room.id, RoomRequest::new("101", "suite", 250.0))
            .await
            .unwrap();
        assert_eq!(updated.id, room.id);
        assert_eq!(updated.room_type, "suite");
        assert_eq!(updated.price, 250.0);
    }

    #[tokio::test]
    async fn test_update_cannot_take_another_rooms_number() {
        let repo = LocalRepository::new();
        add_room(&repo, RoomRequest::new("101", "double", 120.0)).await.unwrap();
        let other = add_room(&repo, RoomRequest::new("102", "single", 80.0)).await.unwrap();

        let err = update_room(&repo, other.id, RoomRequest::new("101", "single", 80.0))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), messages::ROOM_NUMBER_TAKEN);
    }

    #[tokio::test]
    async fn test_update_unknown_room_wins_over_missing_fields() {
        let repo = LocalRepository::new();
        let err = update_room(&repo, RoomId(42), RoomRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(ref m) if m == messages::ROOM_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_delete_room_removes_its_reservations() {
        let repo = LocalRepository::new();
        let locks = RoomLocks::new();
        let client = repo
            .insert_client(&NewClient::new("Bob", "bob@example.com"))
            .await
            .unwrap();
        let room = add_room(&repo, RoomRequest::new("101", "double", 120.0)).await.unwrap();
        let window = StayWindow::new(
            parse_date("2024-06-01").unwrap(),
            parse_date("2024-06-05").unwrap(),
        );
        let booking = repo.seed_reservation(NewReservation::confirmed(client.id, room.id, window));

        delete_room(&repo, &locks, room.id).await.unwrap();
        assert!(repo.get_reservation(booking).await.unwrap_err().is_not_found());
        assert!(locks.is_empty());

        let err = delete_room(&repo, &locks, room.id).await.unwrap_err();
        assert_eq!(err.to_string(), messages::ROOM_NOT_FOUND);
    }
}
