//! Postgres repository implementation using Diesel.
//!
//! Tables (see `migrations/`): `clients`, `rooms`, `reservations`, with unique
//! constraints on client email and room number and cascading foreign keys
//! from reservations to both parents.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//! - Query statistics for health reporting
//! - Automatic migration execution
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use diesel::dsl::not;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel::sql_types::Bool;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task;

use crate::db::repository::{
    ClientRepository, ErrorContext, RepositoryError, RepositoryResult, ReservationRepository,
    RoomRepository,
};
use crate::models::{
    Client, ClientId, NewClient, NewReservation, NewRoom, Reservation, ReservationId,
    ReservationStatus, Room, RoomId, StayWindow,
};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

/// Read a numeric env var, falling back to `default` when unset or malformed.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl PostgresConfig {
    /// Create configuration from the environment variables listed in the
    /// module docs.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let defaults = Self::default();
        Ok(Self {
            database_url,
            max_pool_size: env_or("PG_POOL_MAX", defaults.max_pool_size),
            min_pool_size: env_or("PG_POOL_MIN", defaults.min_pool_size),
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", defaults.connection_timeout_sec),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", defaults.idle_timeout_sec),
            max_retries: env_or("PG_MAX_RETRIES", defaults.max_retries),
            retry_delay_ms: env_or("PG_RETRY_DELAY_MS", defaults.retry_delay_ms),
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Pool health statistics.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Number of connections currently in use
    pub connections_in_use: u32,
    /// Number of idle connections
    pub idle_connections: u32,
    /// Maximum pool size
    pub max_size: u32,
    /// Total queries executed
    pub total_queries: u64,
    /// Total failed queries
    pub failed_queries: u64,
    /// Total retried operations
    pub retried_operations: u64,
}

#[derive(Debug, Default)]
struct QueryCounters {
    total: AtomicU64,
    failed: AtomicU64,
    retried: AtomicU64,
}

/// Diesel-backed repository for Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
    counters: Arc<QueryCounters>,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
                RepositoryError::internal_with_context(
                    format!("Migration failed: {}", e),
                    ErrorContext::new("run_migrations"),
                )
            })?;
        }
        log::info!("Postgres repository ready (pool max={})", config.max_pool_size);

        Ok(Self {
            pool,
            config,
            counters: Arc::new(QueryCounters::default()),
        })
    }

    /// Run `f` on a pooled connection inside `spawn_blocking`, retrying with
    /// exponential backoff while the error is retryable.
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let mut retry_delay = Duration::from_millis(self.config.retry_delay_ms);
        let counters = Arc::clone(&self.counters);

        task::spawn_blocking(move || {
            let mut attempt = 0;
            loop {
                let outcome = pool
                    .get()
                    .map_err(|e| {
                        RepositoryError::timeout_with_context(
                            e.to_string(),
                            ErrorContext::new("get_connection")
                                .with_details(format!("attempt={}", attempt + 1)),
                        )
                    })
                    .and_then(|mut conn| {
                        counters.total.fetch_add(1, Ordering::Relaxed);
                        f.clone()(&mut conn)
                    });

                match outcome {
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        log::warn!("Retrying after transient database error: {}", e);
                        counters.retried.fetch_add(1, Ordering::Relaxed);
                        std::thread::sleep(retry_delay);
                        retry_delay *= 2;
                        attempt += 1;
                    }
                    Err(e) => {
                        counters.failed.fetch_add(1, Ordering::Relaxed);
                        return Err(e);
                    }
                    Ok(value) => return Ok(value),
                }
            }
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }

    /// Get pool health statistics.
    pub fn get_pool_stats(&self) -> PoolStats {
        let state = self.pool.state();
        PoolStats {
            connections_in_use: state.connections - state.idle_connections,
            idle_connections: state.idle_connections,
            max_size: self.config.max_pool_size,
            total_queries: self.counters.total.load(Ordering::Relaxed),
            failed_queries: self.counters.failed.load(Ordering::Relaxed),
            retried_operations: self.counters.retried.load(Ordering::Relaxed),
        }
    }
}

fn db_error(operation: &'static str, entity: &'static str) -> impl Fn(diesel::result::Error) -> RepositoryError {
    move |err| {
        let mapped = RepositoryError::from(err);
        let details = mapped.context().details.clone();
        let mut context = ErrorContext::new(operation).with_entity(entity);
        context.details = details;
        context.retryable = mapped.is_retryable();
        match mapped {
            RepositoryError::ConflictError { message, .. } => {
                RepositoryError::ConflictError { message, context }
            }
            RepositoryError::ValidationError { message, .. } => {
                RepositoryError::ValidationError { message, context }
            }
            RepositoryError::ConnectionError { message, .. } => {
                RepositoryError::ConnectionError { message, context }
            }
            other => other.with_operation(operation),
        }
    }
}

fn not_found(operation: &'static str, entity: &'static str, id: i64) -> RepositoryError {
    RepositoryError::not_found_with_context(
        format!("{} {} not found", entity, id),
        ErrorContext::new(operation)
            .with_entity(entity)
            .with_entity_id(id),
    )
}

type ReservationFilter = Box<dyn BoxableExpression<reservations::table, Pg, SqlType = Bool>>;

/// Active reservations conflicting with `window`, in SQL. Mirrors
/// [`StayWindow::conflicts_with`] term for term.
fn blocks_window(window: &StayWindow) -> ReservationFilter {
    let (qa, qd) = (window.arrival, window.departure);
    Box::new(
        reservations::status
            .ne(ReservationStatus::Cancelled.as_str())
            .and(not(reservations::arrival_date
                .le(qa)
                .or(reservations::arrival_date.ge(qd))
                .and(
                    reservations::departure_date
                        .le(qa)
                        .or(reservations::departure_date.ge(qd)),
                ))),
    )
}

#[async_trait]
impl ClientRepository for PostgresRepository {
    async fn insert_client(&self, client: &NewClient) -> RepositoryResult<Client> {
        let row = NewClientRow::from(client);
        self.with_conn(move |conn| {
            diesel::insert_into(clients::table)
                .values(&row)
                .returning(ClientRow::as_returning())
                .get_result(conn)
                .map(Client::from)
                .map_err(db_error("insert_client", "client"))
        })
        .await
    }

    async fn get_client(&self, client_id: ClientId) -> RepositoryResult<Client> {
        let id = client_id.value();
        self.with_conn(move |conn| {
            clients::table
                .find(id)
                .select(ClientRow::as_select())
                .first(conn)
                .optional()
                .map_err(db_error("get_client", "client"))?
                .map(Client::from)
                .ok_or_else(|| not_found("get_client", "client", id))
        })
        .await
    }

    async fn find_client_by_email(&self, email: &str) -> RepositoryResult<Option<Client>> {
        let email = email.to_string();
        self.with_conn(move |conn| {
            clients::table
                .filter(clients::email.eq(&email))
                .select(ClientRow::as_select())
                .first(conn)
                .optional()
                .map(|row| row.map(Client::from))
                .map_err(db_error("find_client_by_email", "client"))
        })
        .await
    }

    async fn list_clients(&self) -> RepositoryResult<Vec<Client>> {
        self.with_conn(|conn| {
            clients::table
                .order(clients::id.asc())
                .select(ClientRow::as_select())
                .load(conn)
                .map(|rows| rows.into_iter().map(Client::from).collect())
                .map_err(db_error("list_clients", "client"))
        })
        .await
    }
}

#[async_trait]
impl RoomRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(db_error("health_check", "database"))
        })
        .await
    }

    async fn insert_room(&self, room: &NewRoom) -> RepositoryResult<Room> {
        let row = RoomValuesRow::from(room);
        self.with_conn(move |conn| {
            diesel::insert_into(rooms::table)
                .values(&row)
                .returning(RoomRow::as_returning())
                .get_result(conn)
                .map(Room::from)
                .map_err(db_error("insert_room", "room"))
        })
        .await
    }

    async fn get_room(&self, room_id: RoomId) -> RepositoryResult<Room> {
        let id = room_id.value();
        self.with_conn(move |conn| {
            rooms::table
                .find(id)
                .select(RoomRow::as_select())
                .first(conn)
                .optional()
                .map_err(db_error("get_room", "room"))?
                .map(Room::from)
                .ok_or_else(|| not_found("get_room", "room", id))
        })
        .await
    }

    async fn find_room_by_number(&self, number: &str) -> RepositoryResult<Option<Room>> {
        let number = number.to_string();
        self.with_conn(move |conn| {
            rooms::table
                .filter(rooms::number.eq(&number))
                .select(RoomRow::as_select())
                .first(conn)
                .optional()
                .map(|row| row.map(Room::from))
                .map_err(db_error("find_room_by_number", "room"))
        })
        .await
    }

    async fn update_room(&self, room_id: RoomId, room: &NewRoom) -> RepositoryResult<Room> {
        let id = room_id.value();
        let changes = RoomValuesRow::from(room);
        self.with_conn(move |conn| {
            diesel::update(rooms::table.find(id))
                .set(&changes)
                .returning(RoomRow::as_returning())
                .get_result(conn)
                .optional()
                .map_err(db_error("update_room", "room"))?
                .map(Room::from)
                .ok_or_else(|| not_found("update_room", "room", id))
        })
        .await
    }

    async fn delete_room(&self, room_id: RoomId) -> RepositoryResult<()> {
        let id = room_id.value();
        self.with_conn(move |conn| {
            // Reservations go with the room through ON DELETE CASCADE.
            let deleted = diesel::delete(rooms::table.find(id))
                .execute(conn)
                .map_err(db_error("delete_room", "room"))?;
            if deleted == 0 {
                return Err(not_found("delete_room", "room", id));
            }
            Ok(())
        })
        .await
    }

    async fn list_rooms(&self) -> RepositoryResult<Vec<Room>> {
        self.with_conn(|conn| {
            rooms::table
                .order(rooms::id.asc())
                .select(RoomRow::as_select())
                .load(conn)
                .map(|rows| rows.into_iter().map(Room::from).collect())
                .map_err(db_error("list_rooms", "room"))
        })
        .await
    }

    async fn list_available_rooms(&self, window: &StayWindow) -> RepositoryResult<Vec<Room>> {
        let window = *window;
        self.with_conn(move |conn| {
            conn.transaction(|conn| {
                let busy: Vec<i64> = reservations::table
                    .filter(blocks_window(&window))
                    .select(reservations::room_id)
                    .distinct()
                    .load(conn)?;

                rooms::table
                    .filter(rooms::id.ne_all(busy))
                    .order(rooms::id.asc())
                    .select(RoomRow::as_select())
                    .load(conn)
            })
            .map(|rows| rows.into_iter().map(Room::from).collect())
            .map_err(db_error("list_available_rooms", "room"))
        })
        .await
    }
}

#[async_trait]
impl ReservationRepository for PostgresRepository {
    async fn insert_reservation(
        &self,
        reservation: &NewReservation,
    ) -> RepositoryResult<Reservation> {
        let row = NewReservationRow::from(reservation);
        self.with_conn(move |conn| {
            let stored = diesel::insert_into(reservations::table)
                .values(&row)
                .returning(ReservationRow::as_returning())
                .get_result(conn)
                .map_err(db_error("insert_reservation", "reservation"))?;
            Reservation::try_from(stored)
        })
        .await
    }

    async fn get_reservation(
        &self,
        reservation_id: ReservationId,
    ) -> RepositoryResult<Reservation> {
        let id = reservation_id.value();
        self.with_conn(move |conn| {
            let row = reservations::table
                .find(id)
                .select(ReservationRow::as_select())
                .first(conn)
                .optional()
                .map_err(db_error("get_reservation", "reservation"))?
                .ok_or_else(|| not_found("get_reservation", "reservation", id))?;
            Reservation::try_from(row)
        })
        .await
    }

    async fn delete_reservation(&self, reservation_id: ReservationId) -> RepositoryResult<()> {
        let id = reservation_id.value();
        self.with_conn(move |conn| {
            let deleted = diesel::delete(reservations::table.find(id))
                .execute(conn)
                .map_err(db_error("delete_reservation", "reservation"))?;
            if deleted == 0 {
                return Err(not_found("delete_reservation", "reservation", id));
            }
            Ok(())
        })
        .await
    }

    async fn find_overlapping_reservations(
        &self,
        room_id: RoomId,
        window: &StayWindow,
    ) -> RepositoryResult<Vec<Reservation>> {
        let id = room_id.value();
        let window = *window;
        self.with_conn(move |conn| {
            let rows = reservations::table
                .filter(reservations::room_id.eq(id))
                .filter(blocks_window(&window))
                .order(reservations::id.asc())
                .select(ReservationRow::as_select())
                .load(conn)
                .map_err(db_error("find_overlapping_reservations", "reservation"))?;
            rows_to_reservations(rows)
        })
        .await
    }

    async fn list_reservations_for_room(
        &self,
        room_id: RoomId,
    ) -> RepositoryResult<Vec<Reservation>> {
        let id = room_id.value();
        self.with_conn(move |conn| {
            let rows = reservations::table
                .filter(reservations::room_id.eq(id))
                .order((reservations::arrival_date.asc(), reservations::id.asc()))
                .select(ReservationRow::as_select())
                .load(conn)
                .map_err(db_error("list_reservations_for_room", "reservation"))?;
            rows_to_reservations(rows)
        })
        .await
    }
}
