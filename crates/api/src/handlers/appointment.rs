//! Handlers for the `/appointments` resource.
//!
//! Every route requires authentication. Ordinary users operate on their own
//! appointments only and are held to the 48-hour mutation cutoff; admins
//! bypass both checks (see `consulta_core::scheduling::can_mutate`).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use consulta_core::error::CoreError;
use consulta_core::scheduling::{self, MutationDenial};
use consulta_core::types::DbId;
use consulta_db::models::appointment::{Appointment, CreateAppointment, UpdateAppointment};
use consulta_db::repositories::{AppointmentRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::{appointment_details, recipient, spawn_email};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Map a rule-engine denial onto an HTTP 403 with a specific message.
fn mutation_gate(
    appointment: &Appointment,
    actor: &AuthUser,
) -> Result<(), AppError> {
    scheduling::can_mutate(
        appointment.user_id,
        appointment.date,
        actor.user_id,
        actor.is_admin(),
        Utc::now(),
    )
    .map_err(|denial| {
        let msg = match denial {
            MutationDenial::NotOwner => "You do not have permission to modify this appointment",
            MutationDenial::TooLate => {
                "Appointments cannot be changed less than 48 hours in advance"
            }
        };
        AppError::Core(CoreError::Forbidden(msg.into()))
    })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/appointments
///
/// Own appointments, soonest first. Admins see everyone's, joined with the
/// owner's contact details.
pub async fn list(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Response> {
    if auth_user.is_admin() {
        let appointments = AppointmentRepo::list_all_with_owner(&state.pool).await?;
        Ok(Json(appointments).into_response())
    } else {
        let appointments = AppointmentRepo::list_by_user(&state.pool, auth_user.user_id).await?;
        Ok(Json(appointments).into_response())
    }
}

/// GET /api/v1/appointments/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    auth_user: AuthUser,
) -> AppResult<Json<Appointment>> {
    let appointment = AppointmentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Appointment",
            id,
        }))?;

    if appointment.user_id != auth_user.user_id && !auth_user.is_admin() {
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not have access to this appointment".into(),
        )));
    }

    Ok(Json(appointment))
}

/// POST /api/v1/appointments
///
/// Book a new appointment for the authenticated user. Weekend dates and
/// off-grid slots are rejected before anything is written.
pub async fn create(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<CreateAppointment>,
) -> AppResult<(StatusCode, Json<Appointment>)> {
    if input.reason.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Reason must not be empty".into(),
        )));
    }
    scheduling::validate_booking(input.date, &input.time_slot)?;

    let appointment = AppointmentRepo::create(&state.pool, auth_user.user_id, &input).await?;
    tracing::info!(
        appointment_id = appointment.id,
        user_id = auth_user.user_id,
        date = %appointment.date,
        slot = %appointment.time_slot,
        "Appointment booked"
    );

    if let Some(owner) = UserRepo::find_by_id(&state.pool, auth_user.user_id).await? {
        let to = recipient(&owner);
        let details = appointment_details(&appointment);
        spawn_email(state.mailer.clone(), move |mailer| async move {
            mailer.send_booking_confirmation(&to, &details).await
        });
    }

    Ok((StatusCode::CREATED, Json(appointment)))
}

/// PUT /api/v1/appointments/{id}
///
/// Edit an appointment, subject to the ownership and 48-hour rules.
/// Owner reassignment is an admin-route capability and is ignored here.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    auth_user: AuthUser,
    Json(mut input): Json<UpdateAppointment>,
) -> AppResult<Json<Appointment>> {
    let appointment = AppointmentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Appointment",
            id,
        }))?;

    mutation_gate(&appointment, &auth_user)?;
    input.user_id = None;

    // Validate the slot the appointment will land on after the patch.
    let target_date = input.date.unwrap_or(appointment.date);
    let target_slot = input.time_slot.as_deref().unwrap_or(&appointment.time_slot);
    scheduling::validate_booking(target_date, target_slot)?;

    let updated = AppointmentRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Appointment",
            id,
        }))?;

    if let Some(owner) = UserRepo::find_by_id(&state.pool, updated.user_id).await? {
        let to = recipient(&owner);
        let details = appointment_details(&updated);
        spawn_email(state.mailer.clone(), move |mailer| async move {
            mailer.send_booking_updated(&to, &details).await
        });
    }

    Ok(Json(updated))
}

/// DELETE /api/v1/appointments/{id}
///
/// Cancel an appointment, subject to the same gate as editing.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    auth_user: AuthUser,
) -> AppResult<StatusCode> {
    let appointment = AppointmentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Appointment",
            id,
        }))?;

    mutation_gate(&appointment, &auth_user)?;

    AppointmentRepo::delete(&state.pool, id).await?;
    tracing::info!(appointment_id = id, "Appointment cancelled");

    if let Some(owner) = UserRepo::find_by_id(&state.pool, appointment.user_id).await? {
        let to = recipient(&owner);
        let details = appointment_details(&appointment);
        spawn_email(state.mailer.clone(), move |mailer| async move {
            mailer.send_booking_cancelled(&to, &details).await
        });
    }

    Ok(StatusCode::NO_CONTENT)
}
