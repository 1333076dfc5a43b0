pub mod admin;
pub mod appointment;
pub mod auth;
pub mod availability;
pub mod cron;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                 register (public)
/// /auth/login                  login (public)
/// /auth/verify                 token check (requires auth)
///
/// /appointments                list, create (requires auth)
/// /appointments/{id}           get, update, delete (owner or admin)
///
/// /availability/dates          30-day booking calendar (requires auth)
/// /availability/slots          per-day slot board (requires auth)
///
/// /admin/stats                 dashboard statistics (admin only)
/// /admin/users                 list (admin only)
/// /admin/users/{id}            get, update, delete
/// /admin/appointments          list with owners (admin only)
/// /admin/appointments/{id}     get, update, delete
/// /admin/availability          list, upsert curated slots (admin only)
///
/// /cron/reminders              reminder sweep trigger (CRON_SECRET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Registration, login, and token verification.
        .nest("/auth", auth::router())
        // Patient-facing appointment CRUD.
        .nest("/appointments", appointment::router())
        // Booking calendar and per-day slot boards.
        .nest("/availability", availability::router())
        // Practitioner dashboard and management.
        .nest("/admin", admin::router())
        // External scheduler entry point for the reminder sweep.
        .nest("/cron", cron::router())
}
