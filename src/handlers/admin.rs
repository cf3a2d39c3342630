use argon2::{
    password_hash::{PasswordHash, PasswordVerifier},
    Argon2,
};
use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::{Deserialize, Serialize};

use crate::entities::customer::Gender;
use crate::entities::{booking, bus, customer};
use crate::error::{AppError, AppResult};
use crate::handlers::booking::BookingDetail;
use crate::utils::jwt::create_admin_token;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AdminLoginResponse {
    pub token: String,
}

/// Exchange the operator password for a session token.
///
/// The password itself is only compared here, against an argon2 hash loaded
/// from the environment; every later admin request presents the token.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<AdminLoginRequest>,
) -> AppResult<Json<AdminLoginResponse>> {
    let parsed_hash = PasswordHash::new(&state.config.admin_password_hash)
        .map_err(|e| AppError::Internal(format!("Failed to parse password hash: {}", e)))?;

    Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::Unauthorized("Invalid admin password".to_string()))?;

    let token = create_admin_token(&state.config.jwt_secret, state.config.jwt_expiration_hours)?;

    Ok(Json(AdminLoginResponse { token }))
}

/// List all bookings with customer and route info (admin)
pub async fn list_all_bookings(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<BookingDetail>>> {
    let rows = all_booking_rows(&state.db).await?;
    Ok(Json(rows))
}

/// Export all bookings as a CSV download (admin)
pub async fn export_bookings(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let rows = all_booking_rows(&state.db).await?;

    let mut csv = String::from(
        "Name,Gender,Age,Phone,Email,Bus Route,Travel Date,Booking Date,Seat Number\n",
    );
    for r in &rows {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{},{}\n",
            csv_field(&r.name),
            gender_label(&r.gender),
            r.age,
            csv_field(&r.phone),
            csv_field(&r.email),
            csv_field(&r.route),
            r.travel_date,
            r.booking_date,
            r.seat_number,
        ));
    }

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"bookings.csv\"",
            ),
        ],
        csv,
    ))
}

async fn all_booking_rows(db: &DatabaseConnection) -> AppResult<Vec<BookingDetail>> {
    let bookings = booking::Entity::find().all(db).await?;
    let customers = customer::Entity::find().all(db).await?;
    let buses = bus::Entity::find().all(db).await?;

    let rows: Vec<BookingDetail> = bookings
        .into_iter()
        .filter_map(|b| {
            let customer = customers.iter().find(|c| c.id == b.customer_id)?;
            let route = buses
                .iter()
                .find(|bus| bus.id == b.bus_id)
                .map(|bus| bus.route.clone())
                .unwrap_or_default();

            Some(BookingDetail {
                id: b.id,
                name: customer.name.clone(),
                gender: customer.gender.clone(),
                age: customer.age,
                phone: customer.phone.clone(),
                email: customer.email.clone(),
                route,
                travel_date: b.travel_date,
                booking_date: b.booking_date,
                seat_number: b.seat_number,
            })
        })
        .collect();

    Ok(rows)
}

fn gender_label(gender: &Gender) -> &'static str {
    match gender {
        Gender::Male => "Male",
        Gender::Female => "Female",
        Gender::Other => "Other",
    }
}

/// Quote a CSV field when it contains a delimiter, quote or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_field_plain() {
        assert_eq!(csv_field("Trichy → Chennai"), "Trichy → Chennai");
    }

    #[test]
    fn test_csv_field_quoted() {
        assert_eq!(csv_field("Kumar, Ravi"), "\"Kumar, Ravi\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
