//! Handlers for the `/availability` views.
//!
//! These are read-only projections computed by the rule engine from the
//! appointment store; the curated `availability_slots` calendar is managed
//! through the admin routes.

use axum::extract::{Query, State};
use axum::Json;
use chrono::{Duration, Utc};
use consulta_core::error::CoreError;
use consulta_core::scheduling::{self, DayAvailability, SlotBoard, BOOKING_HORIZON_DAYS};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAuth;
use crate::state::AppState;

/// Query string for `GET /availability/slots`.
#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    /// ISO calendar date, e.g. `2026-03-02`.
    pub date: chrono::NaiveDate,
}

/// GET /api/v1/availability/dates
///
/// The next 30 days of weekday availability. A day with any appointment at
/// all is shown as taken (one session per day in this view).
pub async fn dates(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> AppResult<Json<Vec<DayAvailability>>> {
    let today = Utc::now().date_naive();
    let horizon_end = today + Duration::days(BOOKING_HORIZON_DAYS);

    let booked =
        consulta_db::repositories::AppointmentRepo::list_dates_between(&state.pool, today, horizon_end)
            .await?;

    Ok(Json(scheduling::available_dates(
        &booked,
        today,
        BOOKING_HORIZON_DAYS,
    )))
}

/// GET /api/v1/availability/slots?date=YYYY-MM-DD
///
/// Open and booked slots for one weekday. Weekend dates are a validation
/// error, rejected before the store is consulted.
pub async fn slots(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Query(query): Query<SlotsQuery>,
) -> AppResult<Json<SlotBoard>> {
    if scheduling::is_weekend(query.date) {
        return Err(AppError::Core(CoreError::Validation(
            "No time slots are offered on weekends".into(),
        )));
    }

    let booked =
        consulta_db::repositories::AppointmentRepo::list_slots_on_date(&state.pool, query.date)
            .await?;

    let board = scheduling::open_time_slots(&booked, query.date)?;
    Ok(Json(board))
}
