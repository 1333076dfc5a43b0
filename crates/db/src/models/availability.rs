//! Availability-slot entity model and DTOs.

use chrono::NaiveDate;
use consulta_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Curated availability row, unique per `(date, time_slot)`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AvailabilitySlot {
    pub id: DbId,
    pub date: NaiveDate,
    pub time_slot: String,
    pub available: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for the admin upsert: create the slot row or flip its flag.
#[derive(Debug, Deserialize)]
pub struct UpsertAvailabilitySlot {
    pub date: NaiveDate,
    pub time_slot: String,
    pub available: bool,
}
