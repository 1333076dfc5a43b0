//! Repository for the `appointments` table.

use chrono::NaiveDate;
use consulta_core::types::DbId;
use sqlx::PgPool;

use crate::models::appointment::{
    Appointment, AppointmentWithOwner, CreateAppointment, UpdateAppointment,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, user_id, date, time_slot, reason, notes, reminder_sent, created_at, updated_at";

/// Columns for the owner-joined admin view.
const JOINED_COLUMNS: &str = "a.id, a.user_id, a.date, a.time_slot, a.reason, a.notes, \
     a.reminder_sent, a.created_at, a.updated_at, \
     u.name AS owner_name, u.email AS owner_email";

/// Provides CRUD operations and scheduling queries for appointments.
pub struct AppointmentRepo;

impl AppointmentRepo {
    /// Insert a new appointment for `user_id`, returning the created row.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateAppointment,
    ) -> Result<Appointment, sqlx::Error> {
        let query = format!(
            "INSERT INTO appointments (user_id, date, time_slot, reason, notes)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Appointment>(&query)
            .bind(user_id)
            .bind(input.date)
            .bind(&input.time_slot)
            .bind(&input.reason)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    /// Find an appointment by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Appointment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM appointments WHERE id = $1");
        sqlx::query_as::<_, Appointment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List one user's appointments, soonest first.
    pub async fn list_by_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Appointment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM appointments
             WHERE user_id = $1
             ORDER BY date ASC, time_slot ASC"
        );
        sqlx::query_as::<_, Appointment>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// List every appointment with owner details, soonest first (admin view).
    pub async fn list_all_with_owner(
        pool: &PgPool,
    ) -> Result<Vec<AppointmentWithOwner>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS}
             FROM appointments a
             JOIN users u ON u.id = a.user_id
             ORDER BY a.date ASC, a.time_slot ASC"
        );
        sqlx::query_as::<_, AppointmentWithOwner>(&query)
            .fetch_all(pool)
            .await
    }

    /// Find one appointment with owner details (admin view).
    pub async fn find_by_id_with_owner(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<AppointmentWithOwner>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS}
             FROM appointments a
             JOIN users u ON u.id = a.user_id
             WHERE a.id = $1"
        );
        sqlx::query_as::<_, AppointmentWithOwner>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The dates (one per appointment) booked inside `[from, to)`, feeding
    /// the available-dates view.
    pub async fn list_dates_between(
        pool: &PgPool,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>, sqlx::Error> {
        let rows: Vec<(NaiveDate,)> = sqlx::query_as(
            "SELECT date FROM appointments WHERE date >= $1 AND date < $2",
        )
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(d,)| d).collect())
    }

    /// The time slots already booked on exactly `date`.
    pub async fn list_slots_on_date(
        pool: &PgPool,
        date: NaiveDate,
    ) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT time_slot FROM appointments WHERE date = $1")
                .bind(date)
                .fetch_all(pool)
                .await?;
        Ok(rows.into_iter().map(|(s,)| s).collect())
    }

    /// Update an appointment. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAppointment,
    ) -> Result<Option<Appointment>, sqlx::Error> {
        let query = format!(
            "UPDATE appointments SET
                date = COALESCE($2, date),
                time_slot = COALESCE($3, time_slot),
                reason = COALESCE($4, reason),
                notes = COALESCE($5, notes),
                user_id = COALESCE($6, user_id)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Appointment>(&query)
            .bind(id)
            .bind(input.date)
            .bind(&input.time_slot)
            .bind(&input.reason)
            .bind(&input.notes)
            .bind(input.user_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete an appointment. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Reminder sweep
    // -----------------------------------------------------------------------

    /// Un-notified appointments on the sweep's due date.
    pub async fn list_due_for_reminder(
        pool: &PgPool,
        due_date: NaiveDate,
    ) -> Result<Vec<Appointment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM appointments
             WHERE date = $1 AND reminder_sent = FALSE"
        );
        sqlx::query_as::<_, Appointment>(&query)
            .bind(due_date)
            .fetch_all(pool)
            .await
    }

    /// Flip `reminder_sent` to true. The flag is one-way by convention;
    /// nothing ever writes it back to false.
    pub async fn mark_reminder_sent(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE appointments SET reminder_sent = TRUE WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Dashboard statistics
    // -----------------------------------------------------------------------

    /// Number of appointments with `date` in `[from, to)`.
    pub async fn count_between(
        pool: &PgPool,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM appointments WHERE date >= $1 AND date < $2",
        )
        .bind(from)
        .bind(to)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// The next appointment on or after `from`, with owner details.
    pub async fn next_from(
        pool: &PgPool,
        from: NaiveDate,
    ) -> Result<Option<AppointmentWithOwner>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS}
             FROM appointments a
             JOIN users u ON u.id = a.user_id
             WHERE a.date >= $1
             ORDER BY a.date ASC, a.time_slot ASC
             LIMIT 1"
        );
        sqlx::query_as::<_, AppointmentWithOwner>(&query)
            .bind(from)
            .fetch_optional(pool)
            .await
    }

    /// Number of distinct users with at least one appointment.
    pub async fn count_distinct_patients(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(DISTINCT user_id) FROM appointments")
                .fetch_one(pool)
                .await?;
        Ok(count)
    }
}
