//! HTTP request handlers, one module per resource.

pub mod admin;
pub mod appointment;
pub mod auth;
pub mod availability;
pub mod cron;

use consulta_db::models::user::User;
use consulta_mailer::{AppointmentDetails, Mailer, Recipient};
use std::sync::Arc;

/// Fire-and-forget email dispatch.
///
/// Mail delivery must never decide the fate of an HTTP response, so the send
/// runs on its own task and failures are only logged.
pub(crate) fn spawn_email<F, Fut>(mailer: Arc<Mailer>, send: F)
where
    F: FnOnce(Arc<Mailer>) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = Result<(), consulta_mailer::MailerError>> + Send,
{
    tokio::spawn(async move {
        if let Err(e) = send(mailer).await {
            tracing::warn!(error = %e, "Failed to send email");
        }
    });
}

/// Build a mail recipient from a user row.
pub(crate) fn recipient(user: &User) -> Recipient {
    Recipient {
        name: user.name.clone(),
        email: user.email.clone(),
    }
}

/// Build the email payload from an appointment row.
pub(crate) fn appointment_details(
    appointment: &consulta_db::models::appointment::Appointment,
) -> AppointmentDetails {
    AppointmentDetails {
        date: appointment.date,
        time_slot: appointment.time_slot.clone(),
        reason: appointment.reason.clone(),
        notes: appointment.notes.clone(),
    }
}
