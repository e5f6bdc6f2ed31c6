//! Integration tests for ikigai-api read endpoints
//!
//! Tests cover:
//! - Health and build info (no auth required)
//! - Premium results for every tier, incomplete and missing sessions
//! - Authentication middleware on protected routes
//! - Admin statistics

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use ikigai_api::{build_router, AppState};
use ikigai_common::api::auth::{calculate_hash, request_value};
use ikigai_common::db::{init_database, insert_session};
use ikigai_common::time::now_millis;
use ikigai_common::{TestResults, TestSession};
use serde_json::Value;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method
use uuid::Uuid;

const SECRET: i64 = 424242;

/// Test helper: fresh database in a temp directory
async fn setup_test_db() -> (TempDir, SqlitePool) {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("ikigai.db")).await.unwrap();
    (dir, pool)
}

/// Test helper: app with auth disabled (shared_secret = 0)
fn setup_app(db: SqlitePool) -> axum::Router {
    build_router(AppState::new(db, 0))
}

async fn insert(pool: &SqlitePool, tier: Option<&str>, completed: bool) -> Uuid {
    let mut session = TestSession::new(Uuid::new_v4());
    session.is_completed = completed;
    session.premium_tier = tier.map(str::to_string);
    if completed {
        session.results = Some(TestResults {
            primary_type: "Visionary".to_string(),
        });
    }
    insert_session(pool, &session).await.unwrap();
    session.id
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: GET with valid auth query parameters
fn signed_get(path: &str, secret: i64) -> Request<Body> {
    let timestamp = now_millis();
    let hash = calculate_hash(&request_value(path, timestamp), secret);
    get(&format!("{}?timestamp={}&hash={}", path, timestamp, hash))
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

fn count_unlocked(body: &Value) -> usize {
    body["featureAccess"]
        .as_object()
        .unwrap()
        .values()
        .filter(|v| v.as_bool() == Some(true))
        .count()
}

// =============================================================================
// Public endpoints
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_no_auth_required() {
    let (_dir, db) = setup_test_db().await;
    let app = build_router(AppState::new(db, SECRET));

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "ikigai-api");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_buildinfo() {
    let (_dir, db) = setup_test_db().await;
    let app = build_router(AppState::new(db, SECRET));

    let response = app.oneshot(get("/api/buildinfo")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert!(body["git_hash"].is_string());
    assert!(body["build_profile"].is_string());
}

// =============================================================================
// Premium results
// =============================================================================

#[tokio::test]
async fn test_feature_counts_per_tier() {
    let (_dir, db) = setup_test_db().await;

    for (tier, expected) in [
        (None, 0),
        (Some("roadmap"), 3),
        (Some("personality"), 8),
        (Some("blueprint"), 16),
    ] {
        let id = insert(&db, tier, true).await;
        let app = setup_app(db.clone());

        let response = app
            .oneshot(get(&format!("/api/premium-results/{}", id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "tier {:?}", tier);

        let body = extract_json(response.into_body()).await;
        assert_eq!(body["sessionId"], id.to_string());
        assert_eq!(body["featureAccess"].as_object().unwrap().len(), 16);
        assert_eq!(count_unlocked(&body), expected, "tier {:?}", tier);
        assert_eq!(
            body["detailedAnalysis"].as_object().unwrap().len(),
            expected,
            "tier {:?}",
            tier
        );
        match tier {
            Some(name) => assert_eq!(body["premiumTier"], name),
            None => assert!(body["premiumTier"].is_null()),
        }
    }
}

#[tokio::test]
async fn test_roadmap_analysis_omits_locked_sections() {
    let (_dir, db) = setup_test_db().await;
    let id = insert(&db, Some("roadmap"), true).await;

    let response = setup_app(db)
        .oneshot(get(&format!("/api/premium-results/{}", id)))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;

    let analysis = body["detailedAnalysis"].as_object().unwrap();
    assert!(analysis.contains_key("careerRoadmap"));
    assert!(!analysis.contains_key("personalityProfile"));
    assert_eq!(body["featureAccess"]["aiMentor"], false);
}

#[tokio::test]
async fn test_repeated_requests_identical() {
    let (_dir, db) = setup_test_db().await;
    let id = insert(&db, Some("personality"), true).await;
    let app = setup_app(db);
    let uri = format!("/api/premium-results/{}", id);

    let first = app.clone().oneshot(get(&uri)).await.unwrap();
    let first = axum::body::to_bytes(first.into_body(), usize::MAX).await.unwrap();
    let second = app.oneshot(get(&uri)).await.unwrap();
    let second = axum::body::to_bytes(second.into_body(), usize::MAX).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_incomplete_session_conflict() {
    let (_dir, db) = setup_test_db().await;
    let id = insert(&db, Some("blueprint"), false).await;

    let response = setup_app(db)
        .oneshot(get(&format!("/api/premium-results/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["code"], "TEST_INCOMPLETE");
    assert!(body.get("featureAccess").is_none());
}

#[tokio::test]
async fn test_unknown_session_not_found() {
    let (_dir, db) = setup_test_db().await;

    let response = setup_app(db)
        .oneshot(get(&format!("/api/premium-results/{}", Uuid::new_v4())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["code"], "SESSION_NOT_FOUND");
}

#[tokio::test]
async fn test_malformed_session_id() {
    let (_dir, db) = setup_test_db().await;

    let response = setup_app(db)
        .oneshot(get("/api/premium-results/not-a-uuid"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["code"], "INVALID_SESSION_ID");
}

#[tokio::test]
async fn test_unrecognized_stored_tier_is_server_error() {
    let (_dir, db) = setup_test_db().await;
    let id = insert(&db, Some("gold"), true).await;

    let response = setup_app(db)
        .oneshot(get(&format!("/api/premium-results/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["code"], "TIER_CONFIGURATION");
}

#[tokio::test]
async fn test_unrecognized_tier_survives_migration() {
    use ikigai_common::db::init::create_schema;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("ikigai.db");
    let id = Uuid::new_v4();

    // Rows written before any migration has run
    {
        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();
        create_schema(&pool).await.unwrap();
        sqlx::query(
            "INSERT INTO test_sessions (id, is_completed, premium_tier, primary_type, created_at, updated_at)
             VALUES (?, 1, 'gold-typo', 'Visionary', CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)",
        )
        .bind(id.to_string())
        .execute(&pool)
        .await
        .unwrap();
        pool.close().await;
    }

    let db = init_database(&db_path).await.unwrap();
    let stored = ikigai_common::db::load_session(&db, id).await.unwrap().unwrap();
    assert_eq!(stored.premium_tier.as_deref(), Some("gold-typo"));

    let response = setup_app(db)
        .oneshot(get(&format!("/api/premium-results/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["code"], "TIER_CONFIGURATION");
}

#[tokio::test]
async fn test_completed_session_without_results() {
    let (_dir, db) = setup_test_db().await;
    let mut session = TestSession::new(Uuid::new_v4());
    session.is_completed = true;
    session.premium_tier = Some("roadmap".to_string());
    insert_session(&db, &session).await.unwrap();

    let response = setup_app(db)
        .oneshot(get(&format!("/api/premium-results/{}", session.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["code"], "RESULTS_MISSING");
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_protected_route_requires_auth_fields() {
    let (_dir, db) = setup_test_db().await;
    let app = build_router(AppState::new(db, SECRET));

    let response = app.oneshot(get("/api/admin/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["code"], "MISSING_AUTH_FIELDS");
}

#[tokio::test]
async fn test_valid_hash_accepted() {
    let (_dir, db) = setup_test_db().await;
    let id = insert(&db, Some("roadmap"), true).await;
    let app = build_router(AppState::new(db, SECRET));

    let path = format!("/api/premium-results/{}", id);
    let response = app.oneshot(signed_get(&path, SECRET)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_wrong_secret_rejected() {
    let (_dir, db) = setup_test_db().await;
    let app = build_router(AppState::new(db, SECRET));

    let response = app
        .oneshot(signed_get("/api/admin/stats", SECRET + 1))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["code"], "INVALID_HASH");
}

#[tokio::test]
async fn test_hash_bound_to_path() {
    let (_dir, db) = setup_test_db().await;
    let id = insert(&db, Some("blueprint"), true).await;
    let app = build_router(AppState::new(db, SECRET));

    let timestamp = now_millis();
    let hash = calculate_hash(&request_value("/api/admin/stats", timestamp), SECRET);
    let uri = format!(
        "/api/premium-results/{}?timestamp={}&hash={}",
        id, timestamp, hash
    );

    let response = app.oneshot(get(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_stale_timestamp_rejected() {
    let (_dir, db) = setup_test_db().await;
    let app = build_router(AppState::new(db, SECRET));

    let timestamp = now_millis() - 60_000;
    let hash = calculate_hash(&request_value("/api/admin/stats", timestamp), SECRET);
    let uri = format!("/api/admin/stats?timestamp={}&hash={}", timestamp, hash);

    let response = app.oneshot(get(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["code"], "INVALID_TIMESTAMP");
}

// =============================================================================
// Admin statistics
// =============================================================================

#[tokio::test]
async fn test_admin_stats() {
    let (_dir, db) = setup_test_db().await;
    insert(&db, None, false).await;
    insert(&db, Some("roadmap"), true).await;
    insert(&db, Some("blueprint"), true).await;

    let app = build_router(AppState::new(db, SECRET));
    let response = app
        .oneshot(signed_get("/api/admin/stats", SECRET))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["totalSessions"], 3);
    assert_eq!(body["completedSessions"], 2);
    assert_eq!(body["tiers"]["none"], 1);
    assert_eq!(body["tiers"]["roadmap"], 1);
    assert_eq!(body["tiers"]["blueprint"], 1);
    assert_eq!(body["paymentEvents"], 0);
}
