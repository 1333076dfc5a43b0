//! Appointment entity model and DTOs.

use chrono::NaiveDate;
use consulta_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full appointment row from the `appointments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Appointment {
    pub id: DbId,
    pub user_id: DbId,
    pub date: NaiveDate,
    pub time_slot: String,
    pub reason: String,
    pub notes: Option<String>,
    /// One-way flag flipped by the reminder sweep; never reset.
    pub reminder_sent: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Appointment joined with its owner's public details, for admin views.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AppointmentWithOwner {
    pub id: DbId,
    pub user_id: DbId,
    pub date: NaiveDate,
    pub time_slot: String,
    pub reason: String,
    pub notes: Option<String>,
    pub reminder_sent: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub owner_name: String,
    pub owner_email: String,
}

/// DTO for booking a new appointment. The owner comes from the caller's
/// token, never from the payload.
#[derive(Debug, Deserialize)]
pub struct CreateAppointment {
    pub date: NaiveDate,
    pub time_slot: String,
    pub reason: String,
    pub notes: Option<String>,
}

/// DTO for editing an appointment. All fields are optional; `user_id` is
/// honored only on the admin route (reassigning the owner).
#[derive(Debug, Deserialize)]
pub struct UpdateAppointment {
    pub date: Option<NaiveDate>,
    pub time_slot: Option<String>,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub user_id: Option<DbId>,
}
