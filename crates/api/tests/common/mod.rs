//! Shared harness for HTTP-level integration tests.
//!
//! Mirrors the router construction in `main.rs` (via
//! [`build_app_router`]) so tests exercise the same middleware stack that
//! production uses. Requests are driven with `tower::ServiceExt::oneshot`;
//! tokens are minted with the same JWT helper the server validates with.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use pressroom_api::auth::jwt::{generate_access_token, JwtConfig};
use pressroom_api::config::ServerConfig;
use pressroom_api::locks::LockService;
use pressroom_api::router::build_app_router;
use pressroom_api::state::AppState;
use pressroom_core::locking::LockPolicy;
use pressroom_core::types::DbId;
use pressroom_db::models::event::{Event, NewEvent};
use pressroom_db::models::planning::{CreatePlanning, PlanningItem};
use pressroom_db::repositories::{EventRepo, HistoryRepo, PlanningRepo};
use pressroom_events::{EventBus, HistoryRecorder};

const TEST_JWT_SECRET: &str = "test-secret-do-not-use-in-production";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 5,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool. Also spawns the history recorder so history
/// assertions see real rows.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let event_bus = Arc::new(EventBus::default());
    tokio::spawn(HistoryRecorder::run(pool.clone(), event_bus.subscribe()));

    let lock_service = Arc::new(LockService::new(pool.clone(), LockPolicy::default()));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus,
        lock_service,
    };
    build_app_router(state, &config)
}

/// Mint a Bearer token for the given user/session/role.
pub fn token(user_id: DbId, session_id: &str, role: &str) -> String {
    generate_access_token(user_id, session_id, role, &test_config().jwt)
        .expect("token generation should not fail")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = bearer {
        builder = builder.header("authorization", format!("Bearer {t}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str, bearer: Option<&str>) -> Response {
    send(app, Method::GET, uri, bearer, None).await
}

pub async fn post_json(app: Router, uri: &str, bearer: Option<&str>, body: Value) -> Response {
    send(app, Method::POST, uri, bearer, Some(body)).await
}

pub async fn patch_json(app: Router, uri: &str, bearer: Option<&str>, body: Value) -> Response {
    send(app, Method::PATCH, uri, bearer, Some(body)).await
}

pub async fn delete(app: Router, uri: &str, bearer: Option<&str>) -> Response {
    send(app, Method::DELETE, uri, bearer, None).await
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Seed helpers
// ---------------------------------------------------------------------------

/// Insert a draft event one hour long, starting tomorrow.
pub async fn seed_event(pool: &PgPool, name: &str) -> Event {
    let starts_at = chrono::Utc::now() + chrono::Duration::days(1);
    EventRepo::create(
        pool,
        &NewEvent {
            name: name.to_string(),
            description: None,
            starts_at,
            ends_at: starts_at + chrono::Duration::hours(1),
            recurrence_id: None,
        },
    )
    .await
    .unwrap()
}

/// Insert a recurring series of `count` daily occurrences.
pub async fn seed_series(pool: &PgPool, name: &str, count: usize) -> Vec<Event> {
    let recurrence_id = Uuid::new_v4();
    let first_start = chrono::Utc::now() + chrono::Duration::days(1);

    let mut occurrences = Vec::with_capacity(count);
    for i in 0..count {
        let starts_at = first_start + chrono::Duration::days(i as i64);
        let event = EventRepo::create(
            pool,
            &NewEvent {
                name: name.to_string(),
                description: None,
                starts_at,
                ends_at: starts_at + chrono::Duration::hours(1),
                recurrence_id: Some(recurrence_id),
            },
        )
        .await
        .unwrap();
        occurrences.push(event);
    }
    occurrences
}

/// Insert a planning item, optionally linked to an event.
pub async fn seed_planning(pool: &PgPool, slugline: &str, event_id: Option<DbId>) -> PlanningItem {
    PlanningRepo::create(
        pool,
        &CreatePlanning {
            slugline: slugline.to_string(),
            description: None,
            event_id,
        },
    )
    .await
    .unwrap()
}

// ---------------------------------------------------------------------------
// History helpers
// ---------------------------------------------------------------------------

/// Wait until a history row with the given operation appears for the item.
///
/// The history recorder runs as a background task, so rows land shortly
/// after the HTTP response. Polls for up to two seconds.
pub async fn wait_for_history(pool: &PgPool, item_kind: &str, item_id: DbId, operation: &str) -> bool {
    for _ in 0..40 {
        let entries = HistoryRepo::list_for_item(pool, item_kind, item_id)
            .await
            .unwrap();
        if entries.iter().any(|e| e.operation == operation) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}
