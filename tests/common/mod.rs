#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Days, Utc};
use http_body_util::BodyExt;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database};
use tower::ServiceExt;

use bus_booking_backend::config::{hash_admin_password, Config, MailConfig};
use bus_booking_backend::mail::Mailer;
use bus_booking_backend::{routes, AppState};

pub const ADMIN_PASSWORD: &str = "operator-test-password";

/// Router backed by a fresh in-memory store with the seeded routes.
pub async fn test_app() -> Router {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);

    let db = Database::connect(options).await.expect("connect test db");
    Migrator::up(&db, None).await.expect("run migrations");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test-secret".to_string(),
        jwt_expiration_hours: 1,
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        admin_password_hash: hash_admin_password(ADMIN_PASSWORD),
        mail: MailConfig::Console,
    };

    let state = AppState {
        db,
        config,
        mailer: Mailer::Console,
    };

    routes::create_router(state)
}

pub async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    }
}

pub async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// A travel date far enough out that the cancellation window is always open.
pub fn future_date() -> String {
    (Utc::now().date_naive() + Days::new(30)).to_string()
}

pub fn booking_payload(
    name: &str,
    phone: &str,
    email: &str,
    bus_id: i32,
    travel_date: &str,
) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "gender": "Male",
        "age": 30,
        "phone": phone,
        "email": email,
        "bus_id": bus_id,
        "travel_date": travel_date,
    })
}

pub async fn admin_token(app: &Router) -> String {
    let response = request(
        app,
        "POST",
        "/api/admin/login",
        None,
        Some(serde_json::json!({ "password": ADMIN_PASSWORD })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["token"].as_str().unwrap().to_string()
}
