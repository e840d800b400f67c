//! HTTP-level integration tests for the base `/events` and `/planning`
//! resources: CRUD, recurring-series creation, the lock guard on writes,
//! and the history sub-resource.

mod common;

use axum::http::StatusCode;
use chrono::TimeZone;
use common::{
    body_json, build_test_app, delete, get, patch_json, post_json, seed_event, token,
    wait_for_history,
};
use serde_json::json;
use sqlx::PgPool;

use pressroom_db::repositories::EventRepo;

fn event_body(name: &str) -> serde_json::Value {
    let starts_at = chrono::Utc.with_ymd_and_hms(2026, 10, 5, 18, 0, 0).unwrap();
    json!({
        "name": name,
        "starts_at": starts_at,
        "ends_at": starts_at + chrono::Duration::hours(1),
    })
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_single_event(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let t = token(1, "s1", "editor");

    let response = post_json(app, "/api/v1/events", Some(&t), event_body("Jazz night")).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    let created = body.as_array().unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0]["name"], "Jazz night");
    assert_eq!(created[0]["state"], "draft");
    assert!(created[0]["recurrence_id"].is_null());
    assert!(created[0]["lock_user"].is_null());

    let id = created[0]["id"].as_i64().unwrap();
    assert!(wait_for_history(&pool, "events", id, "created").await);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_recurring_series(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let t = token(1, "s1", "editor");

    let starts_at = chrono::Utc.with_ymd_and_hms(2026, 10, 5, 18, 0, 0).unwrap();
    let body = json!({
        "name": "Evening briefing",
        "starts_at": starts_at,
        "ends_at": starts_at + chrono::Duration::minutes(30),
        "recurrence_rule": {"frequency": "daily", "count": 4}
    });

    let response = post_json(app, "/api/v1/events", Some(&t), body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    let created = body.as_array().unwrap();
    assert_eq!(created.len(), 4);

    // All occurrences share one recurrence id and are spaced one day apart.
    let recurrence_id = created[0]["recurrence_id"].as_str().unwrap();
    for occurrence in created {
        assert_eq!(occurrence["recurrence_id"].as_str().unwrap(), recurrence_id);
    }
    let first = EventRepo::find_by_id(&pool, created[0]["id"].as_i64().unwrap())
        .await
        .unwrap()
        .unwrap();
    let second = EventRepo::find_by_id(&pool, created[1]["id"].as_i64().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second.starts_at - first.starts_at, chrono::Duration::days(1));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_with_invalid_recurrence_is_rejected(pool: PgPool) {
    let app = build_test_app(pool);
    let t = token(1, "s1", "editor");

    let starts_at = chrono::Utc.with_ymd_and_hms(2026, 10, 5, 18, 0, 0).unwrap();
    let body = json!({
        "name": "One-off",
        "starts_at": starts_at,
        "ends_at": starts_at + chrono::Duration::hours(1),
        "recurrence_rule": {"frequency": "daily", "count": 1}
    });

    let response = post_json(app, "/api/v1/events", Some(&t), body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_with_inverted_dates_is_rejected(pool: PgPool) {
    let app = build_test_app(pool);
    let t = token(1, "s1", "editor");

    let starts_at = chrono::Utc.with_ymd_and_hms(2026, 10, 5, 18, 0, 0).unwrap();
    let body = json!({
        "name": "Backwards",
        "starts_at": starts_at,
        "ends_at": starts_at - chrono::Duration::hours(1),
    });

    let response = post_json(app, "/api/v1/events", Some(&t), body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_requires_authentication(pool: PgPool) {
    let app = build_test_app(pool);
    let response = post_json(app, "/api/v1/events", None, event_body("Anonymous")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_and_get(pool: PgPool) {
    let event = seed_event(&pool, "Book launch").await;
    let app = build_test_app(pool);
    let t = token(1, "s1", "journalist");

    let response = get(app.clone(), "/api/v1/events", Some(&t)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e["id"].as_i64() == Some(event.id)));

    let response = get(app.clone(), &format!("/api/v1/events/{}", event.id), Some(&t)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["name"], "Book launch");

    let response = get(app, "/api/v1/events/9999", Some(&t)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_patch_updates_fields(pool: PgPool) {
    let event = seed_event(&pool, "Draft title").await;
    let app = build_test_app(pool.clone());
    let t = token(1, "s1", "editor");

    let uri = format!("/api/v1/events/{}", event.id);
    let response = patch_json(app, &uri, Some(&t), json!({"name": "Final title"})).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["name"], "Final title");
    // Untouched fields keep their values.
    assert_eq!(body["state"], "draft");

    assert!(wait_for_history(&pool, "events", event.id, "updated").await);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_patch_rejected_while_locked_by_other_session(pool: PgPool) {
    let event = seed_event(&pool, "Contested event").await;
    EventRepo::acquire_lock(&pool, event.id, 2, "s2", "edit")
        .await
        .unwrap()
        .expect("event should be lockable");

    let app = build_test_app(pool.clone());
    let t = token(1, "s1", "editor");

    let uri = format!("/api/v1/events/{}", event.id);
    let response = patch_json(app, &uri, Some(&t), json!({"name": "Hijacked"})).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let stored = EventRepo::find_by_id(&pool, event.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Contested event");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_patch_allowed_for_lock_owner(pool: PgPool) {
    let event = seed_event(&pool, "My event").await;
    let app = build_test_app(pool);
    let t = token(1, "s1", "editor");

    let lock_uri = format!("/api/v1/events/{}/lock", event.id);
    let response = post_json(app.clone(), &lock_uri, Some(&t), json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);

    let uri = format!("/api/v1/events/{}", event.id);
    let response = patch_json(app, &uri, Some(&t), json!({"name": "My renamed event"})).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_delete_event(pool: PgPool) {
    let event = seed_event(&pool, "Disposable").await;
    let app = build_test_app(pool);
    let t = token(1, "s1", "editor");

    let uri = format!("/api/v1/events/{}", event.id);
    let response = delete(app.clone(), &uri, Some(&t)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(app, &uri, Some(&t)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_delete_rejected_while_locked_by_other_session(pool: PgPool) {
    let event = seed_event(&pool, "Protected").await;
    EventRepo::acquire_lock(&pool, event.id, 2, "s2", "edit")
        .await
        .unwrap()
        .expect("event should be lockable");

    let app = build_test_app(pool.clone());
    let t = token(1, "s1", "editor");

    let response = delete(app, &format!("/api/v1/events/{}", event.id), Some(&t)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    assert!(EventRepo::find_by_id(&pool, event.id).await.unwrap().is_some());
}

// ---------------------------------------------------------------------------
// History sub-resource
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_history_endpoint_lists_operations_in_order(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let t = token(5, "s5", "editor");

    let response = post_json(
        app.clone(),
        "/api/v1/events",
        Some(&t),
        event_body("Tracked event"),
    )
    .await;
    let body = body_json(response).await;
    let id = body[0]["id"].as_i64().unwrap();

    patch_json(
        app.clone(),
        &format!("/api/v1/events/{id}"),
        Some(&t),
        json!({"name": "Tracked event v2"}),
    )
    .await;

    assert!(wait_for_history(&pool, "events", id, "updated").await);

    let response = get(app, &format!("/api/v1/events/{id}/history"), Some(&t)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let entries = body.as_array().unwrap();
    let operations: Vec<_> = entries
        .iter()
        .map(|e| e["operation"].as_str().unwrap())
        .collect();
    assert_eq!(operations, vec!["created", "updated"]);
    // Actor attribution is carried into history.
    assert!(entries.iter().all(|e| e["user_id"].as_i64() == Some(5)));
    // The update payload records the patch.
    assert_eq!(entries[1]["update_json"]["name"], "Tracked event v2");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_history_for_unknown_event_is_404(pool: PgPool) {
    let app = build_test_app(pool);
    let t = token(1, "s1", "editor");

    let response = get(app, "/api/v1/events/424242/history", Some(&t)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Planning resource
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_planning_linked_to_event(pool: PgPool) {
    let event = seed_event(&pool, "Trade show").await;
    let app = build_test_app(pool.clone());
    let t = token(1, "s1", "editor");

    let response = post_json(
        app.clone(),
        "/api/v1/planning",
        Some(&t),
        json!({"slugline": "trade-show-coverage", "event_id": event.id}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["slugline"], "trade-show-coverage");
    assert_eq!(body["event_id"].as_i64(), Some(event.id));

    let id = body["id"].as_i64().unwrap();
    let response = get(app, &format!("/api/v1/planning/{id}"), Some(&t)).await;
    assert_eq!(response.status(), StatusCode::OK);

    assert!(wait_for_history(&pool, "planning", id, "created").await);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_planning_with_dangling_event_link_is_404(pool: PgPool) {
    let app = build_test_app(pool);
    let t = token(1, "s1", "editor");

    let response = post_json(
        app,
        "/api/v1/planning",
        Some(&t),
        json!({"slugline": "orphan", "event_id": 31337}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
