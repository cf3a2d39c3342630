mod common;

use axum::http::{header, StatusCode};
use serde_json::json;

use common::*;

#[tokio::test]
async fn login_rejects_wrong_password() {
    let app = test_app().await;

    let response = request(
        &app,
        "POST",
        "/api/admin/login",
        None,
        Some(json!({ "password": "not-the-password" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_routes_require_a_session_token() {
    let app = test_app().await;

    let response = request(&app, "GET", "/api/admin/bookings", None, None).await;
    assert!(response.status().is_client_error());

    let response = request(&app, "GET", "/api/admin/bookings", Some("garbage"), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_opens_listing_and_export() {
    let app = test_app().await;
    let date = future_date();

    let mut payload = booking_payload("Meena Pillai", "9855555555", "meena@example.com", 1, &date);
    payload["seat_numbers"] = json!([2]);
    let response = request(&app, "POST", "/api/bookings", None, Some(payload)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let token = admin_token(&app).await;

    let response = request(&app, "GET", "/api/admin/bookings", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let rows = body_json(response).await;
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "Meena Pillai");
    assert_eq!(rows[0]["route"], "Trichy → Chennai");
    assert_eq!(rows[0]["seat_number"], 2);

    let response = request(
        &app,
        "GET",
        "/api/admin/bookings/export",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/csv; charset=utf-8"
    );
    assert!(response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .contains("bookings.csv"));

    let csv = body_text(response).await;
    let mut lines = csv.lines();
    assert_eq!(
        lines.next().unwrap(),
        "Name,Gender,Age,Phone,Email,Bus Route,Travel Date,Booking Date,Seat Number"
    );
    let row = lines.next().unwrap();
    assert!(row.starts_with("Meena Pillai,Male,30,9855555555,meena@example.com,Trichy → Chennai,"));
    assert!(row.ends_with(",2"));
}
