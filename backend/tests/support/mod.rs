//! Helpers shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use hotel_backend::db::repository::{ClientRepository, RoomRepository};
use hotel_backend::db::LocalRepository;
use hotel_backend::models::{Client, NewClient, NewRoom, Room};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK poisoned");
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

/// Store with two rooms (`101` double, `102` single) and one client.
pub async fn seeded_repository() -> (LocalRepository, Client, Room, Room) {
    let repo = LocalRepository::new();
    let client = repo
        .insert_client(&NewClient::new("Alice Martin", "alice@example.com"))
        .await
        .expect("insert client");
    let double = repo
        .insert_room(&NewRoom::new("101", "double", 120.0))
        .await
        .expect("insert room 101");
    let single = repo
        .insert_room(&NewRoom::new("102", "single", 80.0))
        .await
        .expect("insert room 102");
    (repo, client, double, single)
}

#[cfg(feature = "http-server")]
pub mod http {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use tower::ServiceExt;

    use hotel_backend::db::repository::FullRepository;
    use hotel_backend::db::LocalRepository;
    use hotel_backend::http::{create_router, AppState};

    pub fn router_for(repo: &LocalRepository) -> Router {
        let repository = Arc::new(repo.clone()) as Arc<dyn FullRepository>;
        create_router(AppState::new(repository))
    }

    /// Send one request and decode the JSON answer (`Value::Null` when empty).
    pub async fn send(
        router: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        send_raw(router, request).await
    }

    pub async fn send_raw(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON body")
        };
        (status, json)
    }
}
