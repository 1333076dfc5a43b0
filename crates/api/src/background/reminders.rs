//! Hourly sweep that emails patients roughly 72 hours before their
//! appointment.
//!
//! Each tick computes the single date whose midnight falls inside the
//! 71-73 hour window around "now + 72h" and sweeps the unsent reminders
//! for that date. The window is two hours wide and the loop ticks hourly,
//! so every appointment is seen by at least one tick even when a tick is
//! delayed. `reminder_sent` makes the sweep idempotent: a re-run (or the
//! external cron route firing alongside the loop) never emails twice.

use std::time::Duration;

use chrono::{DateTime, Utc};
use consulta_core::scheduling;
use consulta_db::repositories::{AppointmentRepo, UserRepo};
use consulta_db::DbPool;
use consulta_mailer::{AppointmentDetails, Mailer, Recipient};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::error::AppResult;

/// How often the sweep runs.
const SWEEP_INTERVAL: Duration = Duration::from_secs(3600); // 1 hour

/// Result of one sweep, returned by the cron route and logged by the loop.
#[derive(Debug, Serialize)]
pub struct SweepOutcome {
    /// Appointments found due for a reminder.
    pub total: usize,
    /// Reminders delivered and marked sent.
    pub sent: usize,
    /// Appointments skipped because of a send or store failure. These stay
    /// unmarked and are retried on the next tick.
    pub errors: usize,
}

/// Sweep the appointments due for a reminder as of `now`.
///
/// Failures on individual appointments are logged and counted but never
/// abort the sweep; only the initial store query can fail the call.
pub async fn run_sweep(
    pool: &DbPool,
    mailer: &Mailer,
    now: DateTime<Utc>,
) -> AppResult<SweepOutcome> {
    let Some(due_date) = scheduling::reminder_due_date(now) else {
        return Ok(SweepOutcome {
            total: 0,
            sent: 0,
            errors: 0,
        });
    };

    let due = AppointmentRepo::list_due_for_reminder(pool, due_date).await?;
    let total = due.len();
    let mut sent = 0usize;
    let mut errors = 0usize;

    for appointment in due {
        let owner = match UserRepo::find_by_id(pool, appointment.user_id).await {
            Ok(Some(owner)) => owner,
            Ok(None) => {
                tracing::warn!(
                    appointment_id = appointment.id,
                    user_id = appointment.user_id,
                    "Reminder sweep: owner no longer exists, skipping"
                );
                errors += 1;
                continue;
            }
            Err(e) => {
                tracing::warn!(
                    appointment_id = appointment.id,
                    error = %e,
                    "Reminder sweep: failed to load owner, skipping"
                );
                errors += 1;
                continue;
            }
        };

        let recipient = Recipient {
            name: owner.name.clone(),
            email: owner.email.clone(),
        };
        let details = AppointmentDetails {
            date: appointment.date,
            time_slot: appointment.time_slot.clone(),
            reason: appointment.reason.clone(),
            notes: appointment.notes.clone(),
        };

        if let Err(e) = mailer.send_reminder(&recipient, &details).await {
            tracing::warn!(
                appointment_id = appointment.id,
                error = %e,
                "Reminder sweep: send failed, will retry next tick"
            );
            errors += 1;
            continue;
        }

        match AppointmentRepo::mark_reminder_sent(pool, appointment.id).await {
            Ok(_) => sent += 1,
            Err(e) => {
                // The email went out but the flag did not stick; the next
                // tick will send a duplicate. Worth a warning.
                tracing::warn!(
                    appointment_id = appointment.id,
                    error = %e,
                    "Reminder sweep: sent but could not mark, duplicate possible"
                );
                errors += 1;
            }
        }
    }

    Ok(SweepOutcome { total, sent, errors })
}

/// Run the reminder sweep loop until `cancel` is triggered.
pub async fn run(pool: DbPool, mailer: Arc<Mailer>, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = SWEEP_INTERVAL.as_secs(),
        "Reminder sweep started"
    );

    let mut interval = tokio::time::interval(SWEEP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Reminder sweep stopping");
                break;
            }
            _ = interval.tick() => {
                match run_sweep(&pool, &mailer, Utc::now()).await {
                    Ok(outcome) => {
                        if outcome.total > 0 {
                            tracing::info!(
                                total = outcome.total,
                                sent = outcome.sent,
                                errors = outcome.errors,
                                "Reminder sweep completed"
                            );
                        } else {
                            tracing::debug!("Reminder sweep: nothing due");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Reminder sweep failed");
                    }
                }
            }
        }
    }
}
