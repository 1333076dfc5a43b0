//! Repository for the `availability_slots` table.

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::models::availability::{AvailabilitySlot, UpsertAvailabilitySlot};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, date, time_slot, available, created_at, updated_at";

/// Provides upsert and range queries for curated availability.
pub struct AvailabilityRepo;

impl AvailabilityRepo {
    /// Insert a slot row or, when `(date, time_slot)` already exists, update
    /// its `available` flag in place.
    pub async fn upsert(
        pool: &PgPool,
        input: &UpsertAvailabilitySlot,
    ) -> Result<AvailabilitySlot, sqlx::Error> {
        let query = format!(
            "INSERT INTO availability_slots (date, time_slot, available)
             VALUES ($1, $2, $3)
             ON CONFLICT ON CONSTRAINT uq_availability_date_slot
             DO UPDATE SET available = EXCLUDED.available
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AvailabilitySlot>(&query)
            .bind(input.date)
            .bind(&input.time_slot)
            .bind(input.available)
            .fetch_one(pool)
            .await
    }

    /// List curated slots with `date` in `[from, to]`, in calendar order.
    pub async fn list_between(
        pool: &PgPool,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AvailabilitySlot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM availability_slots
             WHERE date >= $1 AND date <= $2
             ORDER BY date ASC, time_slot ASC"
        );
        sqlx::query_as::<_, AvailabilitySlot>(&query)
            .bind(from)
            .bind(to)
            .fetch_all(pool)
            .await
    }
}
