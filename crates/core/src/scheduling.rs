//! Booking and reminder rule engine.
//!
//! Pure functions over store snapshots and the current instant. The engine
//! owns no state: the API layer fetches appointment rows, hands them in, and
//! applies whatever the engine decides.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use serde::Serialize;

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// The practice's hourly slot grid: 09:00 through 17:00, minus the 13:00
/// lunch break.
pub const TIME_SLOTS: [&str; 8] = [
    "09:00", "10:00", "11:00", "12:00", "14:00", "15:00", "16:00", "17:00",
];

/// How far ahead the available-dates view looks, in days.
pub const BOOKING_HORIZON_DAYS: i64 = 30;

/// Minimum lead time (hours) for a non-admin to edit or cancel a booking.
pub const MUTATION_CUTOFF_HOURS: i64 = 48;

/// Start of the reminder window, in hours ahead of now.
pub const REMINDER_WINDOW_START_HOURS: i64 = 71;

/// End of the reminder window, in hours ahead of now.
///
/// The window is one hour wider than the nominal 72-hour mark on each side
/// so the hourly sweep cannot miss an appointment that falls between ticks.
pub const REMINDER_WINDOW_END_HOURS: i64 = 73;

// ---------------------------------------------------------------------------
// Slot grid helpers
// ---------------------------------------------------------------------------

/// The practice does not operate on Saturdays or Sundays.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Whether `slot` is one of the fixed grid labels (exact string match).
pub fn is_valid_slot(slot: &str) -> bool {
    TIME_SLOTS.contains(&slot)
}

/// Validate a booking target. Weekends and off-grid slots are rejected
/// before anything touches the store.
pub fn validate_booking(date: NaiveDate, slot: &str) -> Result<(), CoreError> {
    if is_weekend(date) {
        return Err(CoreError::Validation(
            "Appointments cannot be booked on weekends".into(),
        ));
    }
    if !is_valid_slot(slot) {
        return Err(CoreError::Validation(format!(
            "Invalid time slot '{slot}'. Valid slots: {}",
            TIME_SLOTS.join(", ")
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Available dates view
// ---------------------------------------------------------------------------

/// One weekday in the booking horizon, as shown to users picking a date.
#[derive(Debug, Clone, Serialize)]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub available: bool,
    pub appointment_count: usize,
}

/// Compute the available-dates view for `[today, today + horizon_days)`.
///
/// `booked_dates` are the dates of all appointments inside the horizon (one
/// entry per appointment). Weekend dates are excluded entirely; a weekend
/// `today` is skipped, never shifted. A date is unavailable as soon as a
/// single appointment exists on it: the practice runs one patient per day
/// in this view.
pub fn available_dates(
    booked_dates: &[NaiveDate],
    today: NaiveDate,
    horizon_days: i64,
) -> Vec<DayAvailability> {
    (0..horizon_days)
        .filter_map(|offset| today.checked_add_signed(Duration::days(offset)))
        .filter(|date| !is_weekend(*date))
        .map(|date| {
            let appointment_count = booked_dates.iter().filter(|d| **d == date).count();
            DayAvailability {
                date,
                available: appointment_count == 0,
                appointment_count,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Open slots view
// ---------------------------------------------------------------------------

/// Open and booked slots for a single weekday.
#[derive(Debug, Clone, Serialize)]
pub struct SlotBoard {
    pub date: NaiveDate,
    pub open_slots: Vec<&'static str>,
    pub booked_slots: Vec<&'static str>,
}

/// Partition the slot grid for `date` into open and booked slots.
///
/// `booked` holds the `time_slot` values of appointments already on that
/// date. A grid slot counts as booked iff some entry matches it exactly;
/// no normalization is applied, so a stray "9:00" never blocks "09:00".
///
/// A weekend `date` is a validation failure, not an empty board.
pub fn open_time_slots(booked: &[String], date: NaiveDate) -> Result<SlotBoard, CoreError> {
    if is_weekend(date) {
        return Err(CoreError::Validation(
            "No time slots are offered on weekends".into(),
        ));
    }

    let (booked_slots, open_slots): (Vec<&'static str>, Vec<&'static str>) = TIME_SLOTS
        .iter()
        .copied()
        .partition(|slot| booked.iter().any(|b| b.as_str() == *slot));

    Ok(SlotBoard {
        date,
        open_slots,
        booked_slots,
    })
}

// ---------------------------------------------------------------------------
// Edit / cancel eligibility
// ---------------------------------------------------------------------------

/// Why a mutation request was denied. Ownership is checked before timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationDenial {
    /// The actor is neither the owner nor an admin.
    NotOwner,
    /// The appointment starts in under [`MUTATION_CUTOFF_HOURS`].
    TooLate,
}

/// Decide whether `actor_id` may edit or cancel an appointment.
///
/// Admins bypass every check. Non-admins must own the appointment and be at
/// least 48 hours ahead of it. The margin is measured from midnight UTC of
/// the appointment date; the time slot does not move the cutoff. A margin
/// of exactly 48 hours is still allowed.
pub fn can_mutate(
    owner_id: DbId,
    date: NaiveDate,
    actor_id: DbId,
    actor_is_admin: bool,
    now: DateTime<Utc>,
) -> Result<(), MutationDenial> {
    if actor_is_admin {
        return Ok(());
    }
    if owner_id != actor_id {
        return Err(MutationDenial::NotOwner);
    }

    let starts_at = date.and_hms_opt(0, 0, 0).expect("midnight is valid").and_utc();
    if starts_at - now < Duration::hours(MUTATION_CUTOFF_HOURS) {
        return Err(MutationDenial::TooLate);
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Reminder window
// ---------------------------------------------------------------------------

/// The inclusive `[now + 71h, now + 73h]` window a reminder sweep scans.
pub fn reminder_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    (
        now + Duration::hours(REMINDER_WINDOW_START_HOURS),
        now + Duration::hours(REMINDER_WINDOW_END_HOURS),
    )
}

/// The calendar date, if any, whose midnight UTC falls inside the reminder
/// window.
///
/// Appointments carry a date and a slot label, and the stored instant is the
/// date's midnight. Midnights are 24 hours apart and the window is 2 hours
/// wide, so at most one date can qualify per tick; the sweep fetches
/// un-notified appointments on exactly that date.
pub fn reminder_due_date(now: DateTime<Utc>) -> Option<NaiveDate> {
    let (from, to) = reminder_window(now);

    let first = from.date_naive();
    [first, first.succ_opt()?]
        .into_iter()
        .find(|date| {
            let midnight = date.and_hms_opt(0, 0, 0).expect("midnight is valid").and_utc();
            from <= midnight && midnight <= to
        })
}
