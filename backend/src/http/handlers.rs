//! HTTP handlers for the REST API.
//!
//! Each handler unpacks the request, delegates to the domain operation in
//! [`crate::services`] and shapes the JSON answer.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};

use super::dto::{HealthResponse, MessageResponse, MutationResponse, RoomSummary};
use super::error::AppError;
use super::state::AppState;
use crate::models::{ReservationId, RoomId};
use crate::services::{
    self, messages, AvailabilityQuery, ClientRequest, ReservationRequest, RoomRequest,
};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

type JsonBody<T> = Result<Json<T>, JsonRejection>;
type PathId = Result<Path<i64>, PathRejection>;

// =============================================================================
// Service status
// =============================================================================

/// GET /
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Hello !".to_string(),
    })
}

/// GET /health
///
/// Verifies the service is running and the store answers.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Rooms
// =============================================================================

/// GET /api/chambres/disponibles?date_arrivee=YYYY-MM-DD&date_depart=YYYY-MM-DD
pub async fn available_rooms(
    State(state): State<AppState>,
    query: Result<Query<AvailabilityQuery>, QueryRejection>,
) -> HandlerResult<Vec<RoomSummary>> {
    let Query(query) = query?;
    let rooms = services::search_available_rooms(state.repository.as_ref(), &query).await?;
    Ok(Json(rooms.into_iter().map(RoomSummary::from).collect()))
}

/// POST /api/chambres
pub async fn add_room(
    State(state): State<AppState>,
    body: JsonBody<RoomRequest>,
) -> HandlerResult<MutationResponse> {
    let Json(request) = body?;
    services::add_room(state.repository.as_ref(), request).await?;
    Ok(Json(MutationResponse::ok(messages::ROOM_ADDED)))
}

/// PUT /api/chambres/{id}
pub async fn update_room(
    State(state): State<AppState>,
    id: PathId,
    body: JsonBody<RoomRequest>,
) -> HandlerResult<MutationResponse> {
    let Path(id) = id?;
    let Json(request) = body?;
    services::update_room(state.repository.as_ref(), RoomId(id), request).await?;
    Ok(Json(MutationResponse::ok(messages::ROOM_UPDATED)))
}

/// DELETE /api/chambres/{id}
pub async fn delete_room(
    State(state): State<AppState>,
    id: PathId,
) -> HandlerResult<MutationResponse> {
    let Path(id) = id?;
    services::delete_room(state.repository.as_ref(), &state.room_locks, RoomId(id)).await?;
    Ok(Json(MutationResponse::ok(messages::ROOM_DELETED)))
}

// =============================================================================
// Reservations
// =============================================================================

/// POST /api/reservations
pub async fn create_reservation(
    State(state): State<AppState>,
    body: JsonBody<ReservationRequest>,
) -> HandlerResult<MutationResponse> {
    let Json(request) = body?;
    let reservation =
        services::create_reservation(state.repository.as_ref(), &state.room_locks, request)
            .await?;
    tracing::debug!(reservation = %reservation.id, room = %reservation.room_id, "booked");
    Ok(Json(MutationResponse::ok(messages::RESERVATION_CREATED)))
}

/// DELETE /api/reservations/{id}
pub async fn cancel_reservation(
    State(state): State<AppState>,
    id: PathId,
) -> HandlerResult<MutationResponse> {
    let Path(id) = id?;
    services::cancel_reservation(state.repository.as_ref(), ReservationId(id)).await?;
    Ok(Json(MutationResponse::ok(messages::RESERVATION_CANCELLED)))
}

// =============================================================================
// Clients
// =============================================================================

/// POST /api/clients
pub async fn add_client(
    State(state): State<AppState>,
    body: JsonBody<ClientRequest>,
) -> HandlerResult<MutationResponse> {
    let Json(request) = body?;
    services::add_client(state.repository.as_ref(), request).await?;
    Ok(Json(MutationResponse::ok(messages::CLIENT_CREATED)))
}
