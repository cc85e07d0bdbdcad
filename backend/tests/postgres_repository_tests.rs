//! Postgres repository tests.
//!
//! Run with `--features postgres-repo` and `DATABASE_URL` pointing at a
//! scratch database. Without a URL every test returns early.

#![cfg(feature = "postgres-repo")]

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::NaiveDate;
use hotel_backend::db::repository::{ClientRepository, ReservationRepository, RoomRepository};
use hotel_backend::db::{PostgresConfig, PostgresRepository};
use hotel_backend::models::{
    Client, NewClient, NewReservation, NewRoom, ReservationStatus, Room, StayWindow,
};

async fn repository() -> Option<PostgresRepository> {
    let config = PostgresConfig::from_env().ok()?;
    let repo = tokio::task::spawn_blocking(move || PostgresRepository::new(config))
        .await
        .unwrap()
        .unwrap();
    Some(repo)
}

/// Rows from earlier runs stay in the database, so names must not repeat.
fn unique(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}-{}", prefix, nanos)
}

fn window(arrival: &str, departure: &str) -> StayWindow {
    StayWindow::new(
        NaiveDate::parse_from_str(arrival, "%Y-%m-%d").unwrap(),
        NaiveDate::parse_from_str(departure, "%Y-%m-%d").unwrap(),
    )
}

async fn guest_and_room(repo: &PostgresRepository) -> (Client, Room) {
    let email = format!("{}@example.com", unique("guest"));
    let client = repo.insert_client(&NewClient::new("Guest", email)).await.unwrap();
    let room = repo
        .insert_room(&NewRoom::new(unique("room"), "double", 99.5))
        .await
        .unwrap();
    (client, room)
}

#[tokio::test]
async fn test_health_and_pool_stats() {
    let Some(repo) = repository().await else { return };
    assert!(repo.health_check().await.unwrap());
    assert!(repo.get_pool_stats().max_size > 0);
}

#[tokio::test]
async fn test_client_round_trip_and_unique_email() {
    let Some(repo) = repository().await else { return };
    let email = format!("{}@example.com", unique("alice"));
    let client = repo.insert_client(&NewClient::new("Alice", &email)).await.unwrap();

    assert_eq!(repo.get_client(client.id).await.unwrap(), client);
    assert_eq!(
        repo.find_client_by_email(&email).await.unwrap().map(|c| c.id),
        Some(client.id)
    );

    let err = repo
        .insert_client(&NewClient::new("Other", &email))
        .await
        .unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn test_room_update_and_missing_room() {
    let Some(repo) = repository().await else { return };
    let (_, room) = guest_and_room(&repo).await;

    let number = unique("suite");
    let updated = repo
        .update_room(room.id, &NewRoom::new(&number, "suite", 240.0))
        .await
        .unwrap();
    assert_eq!(updated.number, number);
    assert_eq!(updated.price, 240.0);

    repo.delete_room(room.id).await.unwrap();
    assert!(repo.get_room(room.id).await.unwrap_err().is_not_found());
    assert!(repo.delete_room(room.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_overlap_query_matches_local_semantics() {
    let Some(repo) = repository().await else { return };
    let (client, room) = guest_and_room(&repo).await;
    let booked = repo
        .insert_reservation(&NewReservation::confirmed(
            client.id,
            room.id,
            window("2024-06-01", "2024-06-05"),
        ))
        .await
        .unwrap();
    assert_eq!(booked.status, ReservationStatus::Confirmed);

    let overlapping = repo
        .find_overlapping_reservations(room.id, &window("2024-06-03", "2024-06-07"))
        .await
        .unwrap();
    assert_eq!(overlapping.len(), 1);

    let adjacent = repo
        .find_overlapping_reservations(room.id, &window("2024-06-05", "2024-06-09"))
        .await
        .unwrap();
    assert!(adjacent.is_empty());

    let free: Vec<_> = repo
        .list_available_rooms(&window("2024-06-03", "2024-06-07"))
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert!(!free.contains(&room.id));

    repo.delete_reservation(booked.id).await.unwrap();
    assert!(repo
        .find_overlapping_reservations(room.id, &window("2024-06-03", "2024-06-07"))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_room_delete_cascades_to_reservations() {
    let Some(repo) = repository().await else { return };
    let (client, room) = guest_and_room(&repo).await;
    let booked = repo
        .insert_reservation(&NewReservation::confirmed(
            client.id,
            room.id,
            window("2024-07-01", "2024-07-03"),
        ))
        .await
        .unwrap();

    repo.delete_room(room.id).await.unwrap();
    assert!(repo.get_reservation(booked.id).await.unwrap_err().is_not_found());
}
