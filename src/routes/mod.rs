use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::handlers::{admin, booking};
use crate::middleware::auth::{auth_middleware, require_admin};
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // Public booking workflow
    let public_routes = Router::new()
        .route("/routes", get(booking::list_routes))
        .route("/routes/{id}/seats", get(booking::seat_map))
        .route("/bookings", post(booking::create_booking))
        .route("/bookings", get(booking::lookup_bookings))
        .route("/bookings/cancel", post(booking::cancel_booking));

    // Admin routes (requires a valid session token); login itself stays open
    let admin_routes = Router::new()
        .route("/bookings", get(admin::list_all_bookings))
        .route("/bookings/export", get(admin::export_bookings))
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .route("/login", post(admin::login));

    Router::new()
        .nest("/api", public_routes)
        .nest("/api/admin", admin_routes)
        .with_state(state)
}
