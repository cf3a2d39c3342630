use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set, SqlErr,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::customer::Gender;
use crate::entities::{booking, bus, customer};
use crate::error::{AppError, AppResult};
use crate::utils::policy::{cancellation_open, next_free_seats, CANCELLATION_CUTOFF_HOURS};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TravelDateQuery {
    pub travel_date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct RouteAvailability {
    pub id: i32,
    pub route: String,
    pub total_seats: i32,
    pub booked_seats: i32,
    pub available_seats: i32,
}

/// List all routes with seat availability for a travel date.
///
/// Availability is always derived from live bookings, never stored, so a
/// canceled seat is back in the pool on the next read.
pub async fn list_routes(
    State(state): State<AppState>,
    Query(query): Query<TravelDateQuery>,
) -> AppResult<Json<Vec<RouteAvailability>>> {
    let buses = bus::Entity::find().all(&state.db).await?;

    let mut responses = Vec::new();
    for b in buses {
        let booked = booking::Entity::find()
            .filter(booking::Column::BusId.eq(b.id))
            .filter(booking::Column::TravelDate.eq(query.travel_date))
            .count(&state.db)
            .await? as i32;

        responses.push(RouteAvailability {
            id: b.id,
            route: b.route,
            total_seats: b.total_seats,
            booked_seats: booked,
            available_seats: b.total_seats - booked,
        });
    }

    Ok(Json(responses))
}

#[derive(Debug, Serialize)]
pub struct SeatMapResponse {
    pub bus_id: i32,
    pub route: String,
    pub travel_date: NaiveDate,
    pub total_seats: i32,
    pub booked_seats: Vec<i32>,
    pub available_seats: Vec<i32>,
}

/// Seat-level availability for one route and travel date. With no bookings
/// yet, every seat is free.
pub async fn seat_map(
    State(state): State<AppState>,
    Path(bus_id): Path<i32>,
    Query(query): Query<TravelDateQuery>,
) -> AppResult<Json<SeatMapResponse>> {
    let bus = bus::Entity::find_by_id(bus_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Route not found".to_string()))?;

    let mut booked: Vec<i32> = booking::Entity::find()
        .filter(booking::Column::BusId.eq(bus.id))
        .filter(booking::Column::TravelDate.eq(query.travel_date))
        .all(&state.db)
        .await?
        .iter()
        .map(|b| b.seat_number)
        .collect();
    booked.sort_unstable();

    let available: Vec<i32> = (1..=bus.total_seats)
        .filter(|s| !booked.contains(s))
        .collect();

    Ok(Json(SeatMapResponse {
        bus_id: bus.id,
        route: bus.route,
        travel_date: query.travel_date,
        total_seats: bus.total_seats,
        booked_seats: booked,
        available_seats: available,
    }))
}

// ============ Booking ============

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub name: String,
    pub gender: Gender,
    pub age: i32,
    pub phone: String,
    pub email: String,
    pub bus_id: i32,
    pub travel_date: NaiveDate,
    /// Caller-chosen seat numbers; omitted means auto-assign the next free seat.
    pub seat_numbers: Option<Vec<i32>>,
}

#[derive(Debug, Serialize)]
pub struct BookingConfirmation {
    pub booking_ids: Vec<Uuid>,
    pub route: String,
    pub travel_date: NaiveDate,
    pub seat_numbers: Vec<i32>,
    pub email_sent: bool,
}

/// Create one booking row per seat.
///
/// The availability read, the customer lookup and the inserts run in a single
/// transaction, and the unique index on (bus, travel date, seat) backstops
/// concurrent submissions: when two requests race for the last seat, one
/// commits and the other gets a conflict.
pub async fn create_booking(
    State(state): State<AppState>,
    Json(payload): Json<CreateBookingRequest>,
) -> AppResult<Json<BookingConfirmation>> {
    if payload.name.trim().is_empty()
        || payload.phone.trim().is_empty()
        || payload.email.trim().is_empty()
    {
        return Err(AppError::BadRequest(
            "Name, phone and email are required".to_string(),
        ));
    }

    if payload.age < 1 {
        return Err(AppError::BadRequest("Age must be at least 1".to_string()));
    }

    if payload.travel_date < Utc::now().date_naive() {
        return Err(AppError::BadRequest(
            "Travel date cannot be in the past".to_string(),
        ));
    }

    let bus = bus::Entity::find_by_id(payload.bus_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Route not found".to_string()))?;

    if let Some(chosen) = &payload.seat_numbers {
        if chosen.is_empty() {
            return Err(AppError::BadRequest(
                "Select at least one seat".to_string(),
            ));
        }

        let mut deduped = chosen.clone();
        deduped.sort_unstable();
        deduped.dedup();
        if deduped.len() != chosen.len() {
            return Err(AppError::BadRequest(
                "Duplicate seat numbers in request".to_string(),
            ));
        }

        if chosen.iter().any(|s| *s < 1 || *s > bus.total_seats) {
            return Err(AppError::BadRequest(format!(
                "Seat numbers must be between 1 and {}",
                bus.total_seats
            )));
        }
    }

    let txn = state.db.begin().await?;

    // Resolve or create the customer; identity is the email address
    let customer = match customer::Entity::find()
        .filter(customer::Column::Email.eq(&payload.email))
        .one(&txn)
        .await?
    {
        Some(existing) => existing,
        None => {
            let new_customer = customer::ActiveModel {
                name: Set(payload.name.clone()),
                gender: Set(payload.gender.clone()),
                age: Set(payload.age),
                phone: Set(payload.phone.clone()),
                email: Set(payload.email.clone()),
                created_at: Set(Utc::now().into()),
                ..Default::default()
            };

            new_customer.insert(&txn).await.map_err(|e| {
                match e.sql_err() {
                    Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Conflict(
                        "Phone number already registered to another customer".to_string(),
                    ),
                    _ => e.into(),
                }
            })?
        }
    };

    let booked: Vec<i32> = booking::Entity::find()
        .filter(booking::Column::BusId.eq(bus.id))
        .filter(booking::Column::TravelDate.eq(payload.travel_date))
        .all(&txn)
        .await?
        .iter()
        .map(|b| b.seat_number)
        .collect();

    let seats = match &payload.seat_numbers {
        Some(chosen) => {
            if let Some(taken) = chosen.iter().find(|s| booked.contains(*s)) {
                return Err(AppError::Conflict(format!(
                    "Seat {} is already booked",
                    taken
                )));
            }
            chosen.clone()
        }
        None => next_free_seats(bus.total_seats, &booked, 1).ok_or_else(|| {
            AppError::Conflict("No seats available for this route".to_string())
        })?,
    };

    let booking_date = Utc::now().date_naive();
    let mut booking_ids = Vec::with_capacity(seats.len());
    for seat in &seats {
        let booking_id = Uuid::new_v4();
        let row = booking::ActiveModel {
            id: Set(booking_id),
            customer_id: Set(customer.id),
            bus_id: Set(bus.id),
            seat_number: Set(*seat),
            travel_date: Set(payload.travel_date),
            booking_date: Set(booking_date),
            created_at: Set(Utc::now().into()),
        };

        row.insert(&txn).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Conflict(format!("Seat {} was taken by another booking", seat))
            }
            _ => e.into(),
        })?;
        booking_ids.push(booking_id);
    }

    txn.commit().await?;

    // The booking is committed; a failed notification only downgrades the
    // response, it never rolls the booking back
    let body = confirmation_body(&payload.name, &bus.route, payload.travel_date, &seats);
    let email_sent = match state
        .mailer
        .send(&payload.email, "Booking Confirmation - Immanuel Travels", &body)
        .await
    {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Confirmation email not sent: {}", e);
            false
        }
    };

    Ok(Json(BookingConfirmation {
        booking_ids,
        route: bus.route,
        travel_date: payload.travel_date,
        seat_numbers: seats,
        email_sent,
    }))
}

fn confirmation_body(name: &str, route: &str, travel_date: NaiveDate, seats: &[i32]) -> String {
    let seat_list = seats
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Dear {},\n\n\
         Your booking is confirmed!\n\n\
         Route: {}\n\
         Date of Travel: {}\n\
         Seat Number(s): {}\n\n\
         Thank you for choosing Immanuel Travels.",
        name, route, travel_date, seat_list
    )
}

// ============ Cancellation ============

#[derive(Debug, Deserialize)]
pub struct CancelBookingRequest {
    pub email: String,
    pub travel_date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct CancellationConfirmation {
    pub travel_date: NaiveDate,
    pub canceled_seats: Vec<i32>,
    pub email_sent: bool,
}

/// Cancel every booking held by an email address for a travel date.
///
/// Cancellation is keyed on (email, travel date): a customer who booked
/// several seats for that date, even across separate submissions, loses all
/// of them in one call.
pub async fn cancel_booking(
    State(state): State<AppState>,
    Json(payload): Json<CancelBookingRequest>,
) -> AppResult<Json<CancellationConfirmation>> {
    let customer = customer::Entity::find()
        .filter(customer::Column::Email.eq(&payload.email))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("No booking found".to_string()))?;

    let bookings = booking::Entity::find()
        .filter(booking::Column::CustomerId.eq(customer.id))
        .filter(booking::Column::TravelDate.eq(payload.travel_date))
        .all(&state.db)
        .await?;

    if bookings.is_empty() {
        return Err(AppError::NotFound("No booking found".to_string()));
    }

    if !cancellation_open(payload.travel_date, Utc::now()) {
        return Err(AppError::Conflict(format!(
            "Cannot cancel within {} hours of travel",
            CANCELLATION_CUTOFF_HOURS
        )));
    }

    let mut canceled_seats: Vec<i32> = bookings.iter().map(|b| b.seat_number).collect();
    canceled_seats.sort_unstable();

    booking::Entity::delete_many()
        .filter(booking::Column::CustomerId.eq(customer.id))
        .filter(booking::Column::TravelDate.eq(payload.travel_date))
        .exec(&state.db)
        .await?;

    let body = cancellation_body(&customer.name, payload.travel_date, &canceled_seats);
    let email_sent = match state
        .mailer
        .send(&payload.email, "Booking Canceled - Immanuel Travels", &body)
        .await
    {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Cancellation email not sent: {}", e);
            false
        }
    };

    Ok(Json(CancellationConfirmation {
        travel_date: payload.travel_date,
        canceled_seats,
        email_sent,
    }))
}

fn cancellation_body(name: &str, travel_date: NaiveDate, seats: &[i32]) -> String {
    let seat_list = seats
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Dear {},\n\n\
         Your booking for {} has been canceled.\n\
         Seat Number(s): {}\n\n\
         We hope to see you again.",
        name, travel_date, seat_list
    )
}

// ============ Lookup ============

#[derive(Debug, Deserialize)]
pub struct BookingLookupQuery {
    pub email: String,
    pub travel_date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct BookingDetail {
    pub id: Uuid,
    pub name: String,
    pub gender: Gender,
    pub age: i32,
    pub phone: String,
    pub email: String,
    pub route: String,
    pub travel_date: NaiveDate,
    pub booking_date: NaiveDate,
    pub seat_number: i32,
}

/// Look up bookings by the same (email, travel date) key cancellation uses.
pub async fn lookup_bookings(
    State(state): State<AppState>,
    Query(query): Query<BookingLookupQuery>,
) -> AppResult<Json<Vec<BookingDetail>>> {
    let customer = match customer::Entity::find()
        .filter(customer::Column::Email.eq(&query.email))
        .one(&state.db)
        .await?
    {
        Some(c) => c,
        None => return Ok(Json(Vec::new())),
    };

    let bookings = booking::Entity::find()
        .filter(booking::Column::CustomerId.eq(customer.id))
        .filter(booking::Column::TravelDate.eq(query.travel_date))
        .all(&state.db)
        .await?;

    let buses = bus::Entity::find().all(&state.db).await?;

    let details: Vec<BookingDetail> = bookings
        .into_iter()
        .map(|b| {
            let route = buses
                .iter()
                .find(|bus| bus.id == b.bus_id)
                .map(|bus| bus.route.clone())
                .unwrap_or_default();

            BookingDetail {
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
            }
        })
        .collect();

    Ok(Json(details))
}
