//! Handlers for the `/admin` resource: dashboard statistics, user
//! management, full appointment management, and the curated availability
//! calendar. Every handler requires the `admin` role via [`RequireAdmin`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Datelike, Duration, NaiveDate, Utc};
use consulta_core::error::CoreError;
use consulta_core::roles::{ROLE_ADMIN, ROLE_USER};
use consulta_core::scheduling;
use consulta_core::types::DbId;
use consulta_db::models::appointment::{AppointmentWithOwner, UpdateAppointment};
use consulta_db::models::availability::{AvailabilitySlot, UpsertAvailabilitySlot};
use consulta_db::models::user::{UpdateUser, UserResponse};
use consulta_db::repositories::{AppointmentRepo, AvailabilityRepo, UserRepo};
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Dashboard statistics
// ---------------------------------------------------------------------------

/// Aggregate numbers shown on the admin dashboard.
#[derive(Debug, Serialize)]
pub struct AdminStats {
    pub appointments_today: i64,
    pub appointments_this_week: i64,
    pub appointments_this_month: i64,
    pub next_appointment: Option<AppointmentWithOwner>,
    /// Distinct users with at least one appointment on the books.
    pub active_patients: i64,
}

/// First day of the month after `date`.
fn first_of_next_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).expect("first of month is valid")
}

/// GET /api/v1/admin/stats
pub async fn stats(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<AdminStats>> {
    let today = Utc::now().date_naive();

    // Calendar week runs Monday through Sunday.
    let week_start = today - Duration::days(today.weekday().num_days_from_monday() as i64);
    let week_end = week_start + Duration::days(7);

    let month_start = today.with_day(1).expect("day 1 is valid");
    let month_end = first_of_next_month(today);

    let appointments_today =
        AppointmentRepo::count_between(&state.pool, today, today + Duration::days(1)).await?;
    let appointments_this_week =
        AppointmentRepo::count_between(&state.pool, week_start, week_end).await?;
    let appointments_this_month =
        AppointmentRepo::count_between(&state.pool, month_start, month_end).await?;
    let next_appointment = AppointmentRepo::next_from(&state.pool, today).await?;
    let active_patients = AppointmentRepo::count_distinct_patients(&state.pool).await?;

    Ok(Json(AdminStats {
        appointments_today,
        appointments_this_week,
        appointments_this_month,
        next_appointment,
        active_patients,
    }))
}

// ---------------------------------------------------------------------------
// User management
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<Vec<UserResponse>>> {
    let users = UserRepo::list(&state.pool).await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    Ok(Json(user.into()))
}

/// PUT /api/v1/admin/users/{id}
///
/// Update name, email, or role. This is the only way an account becomes an
/// admin.
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUser>,
) -> AppResult<Json<UserResponse>> {
    if let Some(role) = &input.role {
        if role != ROLE_USER && role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Unknown role '{role}'. Valid roles: {ROLE_USER}, {ROLE_ADMIN}"
            ))));
        }
    }
    if let Some(email) = &input.email {
        if !email.validate_email() {
            return Err(AppError::Core(CoreError::Validation(
                "Provide a valid email address".into(),
            )));
        }
    }

    let user = UserRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    Ok(Json(user.into()))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Remove a user. Their appointments are deleted with them (ON DELETE
/// CASCADE on `appointments.user_id`).
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = UserRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
    }
    tracing::info!(user_id = id, "User and their appointments deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Appointment management
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/appointments
pub async fn list_appointments(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<Vec<AppointmentWithOwner>>> {
    let appointments = AppointmentRepo::list_all_with_owner(&state.pool).await?;
    Ok(Json(appointments))
}

/// GET /api/v1/admin/appointments/{id}
pub async fn get_appointment(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<AppointmentWithOwner>> {
    let appointment = AppointmentRepo::find_by_id_with_owner(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Appointment",
            id,
        }))?;
    Ok(Json(appointment))
}

/// PUT /api/v1/admin/appointments/{id}
///
/// Admins may change any field, including reassigning the owner, and are
/// not bound by the 48-hour cutoff.
pub async fn update_appointment(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAppointment>,
) -> AppResult<Json<AppointmentWithOwner>> {
    let appointment = AppointmentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Appointment",
            id,
        }))?;

    let target_date = input.date.unwrap_or(appointment.date);
    let target_slot = input.time_slot.as_deref().unwrap_or(&appointment.time_slot);
    scheduling::validate_booking(target_date, target_slot)?;

    if let Some(new_owner) = input.user_id {
        UserRepo::find_by_id(&state.pool, new_owner)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "User",
                id: new_owner,
            }))?;
    }

    AppointmentRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Appointment",
            id,
        }))?;

    // Re-read joined with the (possibly new) owner for the response.
    let updated = AppointmentRepo::find_by_id_with_owner(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Appointment",
            id,
        }))?;

    Ok(Json(updated))
}

/// DELETE /api/v1/admin/appointments/{id}
pub async fn delete_appointment(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = AppointmentRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Appointment",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Curated availability
// ---------------------------------------------------------------------------

/// Query string for `GET /admin/availability`.
#[derive(Debug, Deserialize)]
pub struct AvailabilityRangeQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// GET /api/v1/admin/availability?from=&to=
///
/// Defaults to the 30-day booking horizon when no range is given.
pub async fn list_availability(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<AvailabilityRangeQuery>,
) -> AppResult<Json<Vec<AvailabilitySlot>>> {
    let today = Utc::now().date_naive();
    let from = query.from.unwrap_or(today);
    let to = query
        .to
        .unwrap_or(today + Duration::days(scheduling::BOOKING_HORIZON_DAYS));

    let slots = AvailabilityRepo::list_between(&state.pool, from, to).await?;
    Ok(Json(slots))
}

/// PUT /api/v1/admin/availability
///
/// Create or update one curated slot. The store keeps at most one row per
/// `(date, time_slot)`.
pub async fn upsert_availability(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<UpsertAvailabilitySlot>,
) -> AppResult<Json<AvailabilitySlot>> {
    scheduling::validate_booking(input.date, &input.time_slot)?;

    let slot = AvailabilityRepo::upsert(&state.pool, &input).await?;
    Ok(Json(slot))
}
