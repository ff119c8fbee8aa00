//! Wire-level coverage of the /auth surface through the real routes.

use migration::{Migrator, MigratorTrait};
use nyumba_auth::api::AuthApi;
use nyumba_auth::app_data::AppData;
use nyumba_auth::config::Settings;
use poem::http::StatusCode;
use poem::test::TestClient;
use poem::Route;
use poem_openapi::OpenApiService;
use sea_orm::Database;
use serde_json::json;

async fn client() -> TestClient<Route> {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");
    Migrator::up(&db, None).await.expect("Failed to run migrations");

    let settings = Settings {
        database_url: "sqlite::memory:".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        jwt_secret: "http-test-jwt-secret".to_string(),
        refresh_token_secret: "http-test-refresh-secret".to_string(),
        access_ttl_minutes: 15,
        refresh_ttl_days: 30,
        default_reset_password: "Chang3Me!".to_string(),
    };
    let app = AppData::init(db, &settings);
    let api = OpenApiService::new(AuthApi::new(app), "Nyumba Identity API", "test");
    TestClient::new(Route::new().nest("/", api))
}

fn signup_body(username: &str, email: &str, phone: &str) -> serde_json::Value {
    json!({
        "username": username,
        "email": email,
        "password": "Str0ngPass",
        "confirm_password": "Str0ngPass",
        "first_name": "Test",
        "phone": phone,
        "role_hint": "owner",
    })
}

#[tokio::test]
async fn test_signup_returns_created_with_status_and_token_pair() {
    let cli = client().await;

    let resp = cli
        .post("/auth/signup")
        .body_json(&signup_body("bakari", "bakari@x.io", "+255712345678"))
        .send()
        .await;
    resp.assert_status(StatusCode::CREATED);

    let body = resp.json().await;
    let body = body.value().object();
    assert_eq!(body.get("status").string(), "approved");
    assert!(!body.get("tokens").object().get("access").string().is_empty());
    assert!(!body.get("tokens").object().get("refresh").string().is_empty());
    assert!(!body.get("access_token").string().is_empty());
}

#[tokio::test]
async fn test_login_accepts_email_field() {
    let cli = client().await;
    cli.post("/auth/signup")
        .body_json(&signup_body("amina", "amina@x.io", "+255712345678"))
        .send()
        .await
        .assert_status(StatusCode::CREATED);

    let resp = cli
        .post("/auth/login")
        .body_json(&json!({ "email": "amina@x.io", "password": "Str0ngPass" }))
        .send()
        .await;
    resp.assert_status_is_ok();

    let body = resp.json().await;
    let body = body.value().object();
    assert_eq!(body.get("status").string(), "approved");
    assert!(!body.get("tokens").object().get("access").string().is_empty());
}

#[tokio::test]
async fn test_login_accepts_phone_field_in_both_forms() {
    let cli = client().await;
    cli.post("/auth/signup")
        .body_json(&signup_body("juma", "juma@x.io", "+255713000001"))
        .send()
        .await
        .assert_status(StatusCode::CREATED);

    for phone in ["+255713000001", "255713000001"] {
        let resp = cli
            .post("/auth/login")
            .body_json(&json!({ "phone": phone, "password": "Str0ngPass" }))
            .send()
            .await;
        resp.assert_status_is_ok();
    }
}

#[tokio::test]
async fn test_login_accepts_legacy_identifier_field() {
    let cli = client().await;
    cli.post("/auth/signup")
        .body_json(&signup_body("neema", "neema@x.io", "+255713000002"))
        .send()
        .await
        .assert_status(StatusCode::CREATED);

    let resp = cli
        .post("/auth/login")
        .body_json(&json!({ "identifier": "neema@x.io", "password": "Str0ngPass" }))
        .send()
        .await;
    resp.assert_status_is_ok();
}

#[tokio::test]
async fn test_login_without_lookup_key_is_rejected() {
    let cli = client().await;
    let resp = cli
        .post("/auth/login")
        .body_json(&json!({ "password": "Str0ngPass" }))
        .send()
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_throttles_by_address_across_identifiers() {
    let cli = client().await;

    // each attempt uses a fresh identifier, so only the address window
    // can shut the caller out
    for i in 0..10 {
        let resp = cli
            .post("/auth/login")
            .body_json(&json!({
                "email": format!("ghost{}@x.io", i),
                "password": "WrongPass1",
            }))
            .send()
            .await;
        resp.assert_status(StatusCode::BAD_REQUEST);
    }

    let resp = cli
        .post("/auth/login")
        .body_json(&json!({ "email": "ghost-final@x.io", "password": "WrongPass1" }))
        .send()
        .await;
    resp.assert_status(StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_refresh_is_throttled() {
    let cli = client().await;

    for _ in 0..10 {
        let resp = cli
            .post("/auth/refresh")
            .body_json(&json!({ "refresh_token": "not-a-real-token" }))
            .send()
            .await;
        resp.assert_status(StatusCode::BAD_REQUEST);
    }

    let resp = cli
        .post("/auth/refresh")
        .body_json(&json!({ "refresh_token": "not-a-real-token" }))
        .send()
        .await;
    resp.assert_status(StatusCode::TOO_MANY_REQUESTS);
}
