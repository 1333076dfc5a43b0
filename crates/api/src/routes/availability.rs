//! Route definitions for the `/availability` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::availability;
use crate::state::AppState;

/// Routes mounted at `/availability`.
///
/// ```text
/// GET /dates         -> dates (30-day calendar)
/// GET /slots?date=   -> slots (per-day time slot board)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dates", get(availability::dates))
        .route("/slots", get(availability::slots))
}
