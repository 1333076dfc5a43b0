//! Route definitions for the `/admin` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET    /stats               -> stats
/// GET    /users               -> list_users
/// GET    /users/{id}          -> get_user
/// PUT    /users/{id}          -> update_user
/// DELETE /users/{id}          -> delete_user
/// GET    /appointments        -> list_appointments
/// GET    /appointments/{id}   -> get_appointment
/// PUT    /appointments/{id}   -> update_appointment
/// DELETE /appointments/{id}   -> delete_appointment
/// GET    /availability        -> list_availability
/// PUT    /availability        -> upsert_availability
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(admin::stats))
        .route("/users", get(admin::list_users))
        .route(
            "/users/{id}",
            get(admin::get_user)
                .put(admin::update_user)
                .delete(admin::delete_user),
        )
        .route("/appointments", get(admin::list_appointments))
        .route(
            "/appointments/{id}",
            get(admin::get_appointment)
                .put(admin::update_appointment)
                .delete(admin::delete_appointment),
        )
        .route(
            "/availability",
            get(admin::list_availability).put(admin::upsert_availability),
        )
}
