//! In-memory local repository implementation.
//!
//! This module provides a local implementation of all repository traits
//! suitable for unit testing and local development. All data is stored in
//! memory using HashMaps behind a single lock, providing fast, deterministic,
//! and isolated execution.
//!
//! The store enforces the same constraints as the Postgres schema: unique
//! client emails, unique room numbers, reservations must reference an existing
//! room and client, and deleting a room removes its reservations.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::db::repository::*;
use crate::models::{
    Client, ClientId, NewClient, NewReservation, NewRoom, Reservation, ReservationId, Room,
    RoomId, StayWindow,
};

/// In-memory local repository.
///
/// # Example
/// ```
/// use hotel_backend::db::repositories::LocalRepository;
/// use hotel_backend::db::repository::RoomRepository;
/// use hotel_backend::models::NewRoom;
///
/// # tokio_test_block_on(async {
/// let repo = LocalRepository::new();
/// let room = repo.insert_room(&NewRoom::new("101", "double", 90.0)).await.unwrap();
/// assert_eq!(room.id.value(), 1);
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Runtime::new().unwrap().block_on(f)
/// # }
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    clients: HashMap<ClientId, Client>,
    rooms: HashMap<RoomId, Room>,
    reservations: HashMap<ReservationId, Reservation>,

    // ID counters
    next_client_id: i64,
    next_room_id: i64,
    next_reservation_id: i64,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            clients: HashMap::new(),
            rooms: HashMap::new(),
            reservations: HashMap::new(),
            next_client_id: 1,
            next_room_id: 1,
            next_reservation_id: 1,
            is_healthy: true,
        }
    }
}

impl LocalData {
    fn number_taken_by_other(&self, number: &str, room_id: Option<RoomId>) -> bool {
        self.rooms
            .values()
            .any(|room| room.number == number && Some(room.id) != room_id)
    }
}

fn sorted_by_id<K, V: Clone>(map: &HashMap<K, V>, id: impl Fn(&V) -> i64) -> Vec<V> {
    let mut values: Vec<V> = map.values().cloned().collect();
    values.sort_by_key(|v| id(v));
    values
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data from the repository.
    pub fn clear(&self) {
        let mut data = self.data.write();
        *data = LocalData {
            is_healthy: data.is_healthy,
            ..Default::default()
        };
    }

    pub fn client_count(&self) -> usize {
        self.data.read().clients.len()
    }

    pub fn room_count(&self) -> usize {
        self.data.read().rooms.len()
    }

    pub fn reservation_count(&self) -> usize {
        self.data.read().reservations.len()
    }

    /// Store a reservation as-is, bypassing every check. Lets tests seed rows a
    /// database could hold but the booking flow never writes, such as
    /// cancelled bookings.
    pub fn seed_reservation(&self, reservation: NewReservation) -> ReservationId {
        let mut data = self.data.write();
        let id = ReservationId(data.next_reservation_id);
        data.next_reservation_id += 1;
        data.reservations.insert(id, reservation.into_reservation(id));
        id
    }

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self, operation: &str) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection_with_context(
                "Database is not healthy",
                ErrorContext::new(operation),
            ));
        }
        Ok(())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn missing(operation: &str, entity: &str, id: impl ToString) -> RepositoryError {
    let id = id.to_string();
    RepositoryError::not_found_with_context(
        format!("{} {} not found", entity, id),
        ErrorContext::new(operation)
            .with_entity(entity)
            .with_entity_id(id),
    )
}

#[async_trait]
impl ClientRepository for LocalRepository {
    async fn insert_client(&self, client: &NewClient) -> RepositoryResult<Client> {
        self.check_health("insert_client")?;
        let mut data = self.data.write();

        if data.clients.values().any(|c| c.email == client.email) {
            return Err(RepositoryError::conflict_with_context(
                format!("Email {} already registered", client.email),
                ErrorContext::new("insert_client")
                    .with_entity("client")
                    .with_details("constraint=clients_email_key"),
            ));
        }

        let id = ClientId(data.next_client_id);
        data.next_client_id += 1;
        let stored = client.clone().into_client(id);
        data.clients.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_client(&self, client_id: ClientId) -> RepositoryResult<Client> {
        self.check_health("get_client")?;
        self.data
            .read()
            .clients
            .get(&client_id)
            .cloned()
            .ok_or_else(|| missing("get_client", "client", client_id))
    }

    async fn find_client_by_email(&self, email: &str) -> RepositoryResult<Option<Client>> {
        self.check_health("find_client_by_email")?;
        Ok(self
            .data
            .read()
            .clients
            .values()
            .find(|c| c.email == email)
            .cloned())
    }

    async fn list_clients(&self) -> RepositoryResult<Vec<Client>> {
        self.check_health("list_clients")?;
        Ok(sorted_by_id(&self.data.read().clients, |c| c.id.value()))
    }
}

#[async_trait]
impl RoomRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn insert_room(&self, room: &NewRoom) -> RepositoryResult<Room> {
        self.check_health("insert_room")?;
        let mut data = self.data.write();

        if data.number_taken_by_other(&room.number, None) {
            return Err(RepositoryError::conflict_with_context(
                format!("Room number {} already exists", room.number),
                ErrorContext::new("insert_room")
                    .with_entity("room")
                    .with_details("constraint=rooms_number_key"),
            ));
        }

        let id = RoomId(data.next_room_id);
        data.next_room_id += 1;
        let stored = room.clone().into_room(id);
        data.rooms.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_room(&self, room_id: RoomId) -> RepositoryResult<Room> {
        self.check_health("get_room")?;
        self.data
            .read()
            .rooms
            .get(&room_id)
            .cloned()
            .ok_or_else(|| missing("get_room", "room", room_id))
    }

    async fn find_room_by_number(&self, number: &str) -> RepositoryResult<Option<Room>> {
        self.check_health("find_room_by_number")?;
        Ok(self
            .data
            .read()
            .rooms
            .values()
            .find(|r| r.number == number)
            .cloned())
    }

    async fn update_room(&self, room_id: RoomId, room: &NewRoom) -> RepositoryResult<Room> {
        self.check_health("update_room")?;
        let mut data = self.data.write();

        if !data.rooms.contains_key(&room_id) {
            return Err(missing("update_room", "room", room_id));
        }
        if data.number_taken_by_other(&room.number, Some(room_id)) {
            return Err(RepositoryError::conflict_with_context(
                format!("Room number {} already exists", room.number),
                ErrorContext::new("update_room")
                    .with_entity("room")
                    .with_entity_id(room_id)
                    .with_details("constraint=rooms_number_key"),
            ));
        }

        let updated = room.clone().into_room(room_id);
        data.rooms.insert(room_id, updated.clone());
        Ok(updated)
    }

    async fn delete_room(&self, room_id: RoomId) -> RepositoryResult<()> {
        self.check_health("delete_room")?;
        let mut data = self.data.write();

        if data.rooms.remove(&room_id).is_none() {
            return Err(missing("delete_room", "room", room_id));
        }
        data.reservations.retain(|_, r| r.room_id != room_id);
        Ok(())
    }

    async fn list_rooms(&self) -> RepositoryResult<Vec<Room>> {
        self.check_health("list_rooms")?;
        Ok(sorted_by_id(&self.data.read().rooms, |r| r.id.value()))
    }

    async fn list_available_rooms(&self, window: &StayWindow) -> RepositoryResult<Vec<Room>> {
        self.check_health("list_available_rooms")?;
        let data = self.data.read();

        let mut available: Vec<Room> = data
            .rooms
            .values()
            .filter(|room| {
                !data.reservations.values().any(|r| {
                    r.room_id == room.id && r.is_active() && window.conflicts_with(&r.window)
                })
            })
            .cloned()
            .collect();
        available.sort_by_key(|r| r.id);
        Ok(available)
    }
}

#[async_trait]
impl ReservationRepository for LocalRepository {
    async fn insert_reservation(
        &self,
        reservation: &NewReservation,
    ) -> RepositoryResult<Reservation> {
        self.check_health("insert_reservation")?;
        let mut data = self.data.write();

        if !data.rooms.contains_key(&reservation.room_id) {
            return Err(RepositoryError::validation_with_context(
                format!("Room {} does not exist", reservation.room_id),
                ErrorContext::new("insert_reservation")
                    .with_entity("reservation")
                    .with_details(format!("constraint={}", ROOM_FOREIGN_KEY)),
            ));
        }
        if !data.clients.contains_key(&reservation.client_id) {
            return Err(RepositoryError::validation_with_context(
                format!("Client {} does not exist", reservation.client_id),
                ErrorContext::new("insert_reservation")
                    .with_entity("reservation")
                    .with_details(format!("constraint={}", CLIENT_FOREIGN_KEY)),
            ));
        }

        let id = ReservationId(data.next_reservation_id);
        data.next_reservation_id += 1;
        let stored = reservation.clone().into_reservation(id);
        data.reservations.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_reservation(
        &self,
        reservation_id: ReservationId,
    ) -> RepositoryResult<Reservation> {
        self.check_health("get_reservation")?;
        self.data
            .read()
            .reservations
            .get(&reservation_id)
            .cloned()
            .ok_or_else(|| missing("get_reservation", "reservation", reservation_id))
    }

    async fn delete_reservation(&self, reservation_id: ReservationId) -> RepositoryResult<()> {
        self.check_health("delete_reservation")?;
        self.data
            .write()
            .reservations
            .remove(&reservation_id)
            .map(|_| ())
            .ok_or_else(|| missing("delete_reservation", "reservation", reservation_id))
    }

    async fn find_overlapping_reservations(
        &self,
        room_id: RoomId,
        window: &StayWindow,
    ) -> RepositoryResult<Vec<Reservation>> {
        self.check_health("find_overlapping_reservations")?;
        let data = self.data.read();

        let mut overlapping: Vec<Reservation> = data
            .reservations
            .values()
            .filter(|r| r.room_id == room_id && r.is_active() && window.conflicts_with(&r.window))
            .cloned()
            .collect();
        overlapping.sort_by_key(|r| r.id);
        Ok(overlapping)
    }

    async fn list_reservations_for_room(
        &self,
        room_id: RoomId,
    ) -> RepositoryResult<Vec<Reservation>> {
        self.check_health("list_reservations_for_room")?;
        let data = self.data.read();

        let mut reservations: Vec<Reservation> = data
            .reservations
            .values()
            .filter(|r| r.room_id == room_id)
            .cloned()
            .collect();
        reservations.sort_by_key(|r| (r.window.arrival, r.id));
        Ok(reservations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{parse_date, ReservationStatus};

    fn window(arrival: &str, departure: &str) -> StayWindow {
        StayWindow::new(parse_date(arrival).unwrap(), parse_date(departure).unwrap())
    }

    async fn seeded() -> (LocalRepository, Client, Room) {
        let repo = LocalRepository::new();
        let client = repo
            .insert_client(&NewClient::new("Alice", "alice@example.com"))
            .await
            .unwrap();
        let room = repo
            .insert_room(&NewRoom::new("101", "double", 90.0))
            .await
            .unwrap();
        (repo, client, room)
    }

    #[tokio::test]
    async fn test_ids_are_sequential_per_entity() {
        let (repo, client, room) = seeded().await;
        assert_eq!(client.id, ClientId(1));
        assert_eq!(room.id, RoomId(1));

        let second = repo
            .insert_room(&NewRoom::new("102", "single", 60.0))
            .await
            .unwrap();
        assert_eq!(second.id, RoomId(2));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let (repo, _, _) = seeded().await;
        let err = repo
            .insert_client(&NewClient::new("Other", "alice@example.com"))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(repo.client_count(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_room_number_is_conflict() {
        let (repo, _, _) = seeded().await;
        let err = repo
            .insert_room(&NewRoom::new("101", "suite", 200.0))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_update_room_keeps_own_number() {
        let (repo, _, room) = seeded().await;
        let updated = repo
            .update_room(room.id, &NewRoom::new("101", "suite", 150.0))
            .await
            .unwrap();
        assert_eq!(updated.room_type, "suite");
        assert_eq!(repo.get_room(room.id).await.unwrap().price, 150.0);
    }

    #[tokio::test]
    async fn test_update_missing_room_is_not_found() {
        let repo = LocalRepository::new();
        let err = repo
            .update_room(RoomId(9), &NewRoom::new("9", "single", 10.0))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.context().entity_id.as_deref(), Some("9"));
    }

    #[tokio::test]
    async fn test_delete_room_cascades_reservations() {
        let (repo, client, room) = seeded().await;
        repo.insert_reservation(&NewReservation::confirmed(
            client.id,
            room.id,
            window("2024-06-01", "2024-06-05"),
        ))
        .await
        .unwrap();

        repo.delete_room(room.id).await.unwrap();
        assert_eq!(repo.reservation_count(), 0);
        assert!(repo.get_room(room.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_reservation_requires_existing_room_and_client() {
        let (repo, client, room) = seeded().await;
        let w = window("2024-06-01", "2024-06-05");

        let err = repo
            .insert_reservation(&NewReservation::confirmed(client.id, RoomId(99), w))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ValidationError { .. }));

        let err = repo
            .insert_reservation(&NewReservation::confirmed(ClientId(99), room.id, w))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ValidationError { .. }));
    }

    #[tokio::test]
    async fn test_available_rooms_ignore_cancelled_reservations() {
        let (repo, client, room) = seeded().await;
        repo.seed_reservation(NewReservation {
            client_id: client.id,
            room_id: room.id,
            window: window("2024-06-01", "2024-06-05"),
            status: ReservationStatus::Cancelled,
        });

        let query = window("2024-06-03", "2024-06-07");
        let available = repo.list_available_rooms(&query).await.unwrap();
        assert_eq!(available.len(), 1);
        assert!(repo
            .find_overlapping_reservations(room.id, &query)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_overlap_query_is_scoped_to_room() {
        let (repo, client, room) = seeded().await;
        let other = repo
            .insert_room(&NewRoom::new("102", "single", 60.0))
            .await
            .unwrap();
        repo.insert_reservation(&NewReservation::confirmed(
            client.id,
            room.id,
            window("2024-06-01", "2024-06-05"),
        ))
        .await
        .unwrap();

        let query = window("2024-06-03", "2024-06-07");
        assert_eq!(
            repo.find_overlapping_reservations(room.id, &query)
                .await
                .unwrap()
                .len(),
            1
        );
        assert!(repo
            .find_overlapping_reservations(other.id, &query)
            .await
            .unwrap()
            .is_empty());

        let available = repo.list_available_rooms(&query).await.unwrap();
        assert_eq!(available, vec![other]);
    }

    #[tokio::test]
    async fn test_unhealthy_store_fails_operations() {
        let (repo, _, room) = seeded().await;
        repo.set_healthy(false);

        assert!(!repo.health_check().await.unwrap());
        let err = repo.get_room(room.id).await.unwrap_err();
        assert!(matches!(err, RepositoryError::ConnectionError { .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_clear_resets_counters() {
        let (repo, _, _) = seeded().await;
        repo.clear();
        assert_eq!(repo.room_count(), 0);
        let room = repo
            .insert_room(&NewRoom::new("201", "double", 80.0))
            .await
            .unwrap();
        assert_eq!(room.id, RoomId(1));
    }
}
