//! HTML templates for the five transactional emails.
//!
//! Each function returns `(subject, html_body)`. The layout is a single
//! centered card with a colored header, shared via [`render_shell`].

use crate::AppointmentDetails;
use chrono::NaiveDate;

/// Shared stylesheet embedded in every email.
const STYLES: &str = r#"
  body { font-family: 'Segoe UI', Arial, sans-serif; background: #f5f5f5; margin: 0; padding: 0; }
  .container { max-width: 600px; margin: 40px auto; background: #ffffff; border-radius: 8px; overflow: hidden; }
  .header { background: #5b8fa8; padding: 32px 40px; text-align: center; }
  .header h1 { color: #ffffff; margin: 0; font-size: 22px; }
  .body { padding: 32px 40px; color: #333333; }
  .body p { line-height: 1.7; margin: 0 0 14px; }
  .info-box { background: #f0f7fb; border-left: 4px solid #5b8fa8; padding: 16px 20px; margin: 20px 0; }
  .info-box p { margin: 6px 0; font-size: 15px; }
  .warning-box { background: #fff8e1; border-left: 4px solid #f9a825; padding: 16px 20px; margin: 20px 0; }
  .footer { background: #f0f0f0; padding: 20px 40px; text-align: center; font-size: 12px; color: #888; }
"#;

/// Format a calendar date as `DD/MM/YYYY` for patient-facing text.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

fn render_shell(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><style>{STYLES}</style></head><body>\
         <div class=\"container\">\
         <div class=\"header\"><h1>{title}</h1></div>\
         <div class=\"body\">{body}</div>\
         <div class=\"footer\">This is an automated message from the practice booking system.</div>\
         </div></body></html>"
    )
}

fn appointment_box(appointment: &AppointmentDetails) -> String {
    let notes = appointment
        .notes
        .as_deref()
        .map(|n| format!("<p><strong>Notes:</strong> {n}</p>"))
        .unwrap_or_default();
    format!(
        "<div class=\"info-box\">\
         <p><strong>Date:</strong> {}</p>\
         <p><strong>Time:</strong> {}</p>\
         <p><strong>Reason:</strong> {}</p>{notes}</div>",
        format_date(appointment.date),
        appointment.time_slot,
        appointment.reason,
    )
}

/// Welcome email after registration.
pub fn welcome(name: &str) -> (String, String) {
    let body = format!(
        "<p>Hello <strong>{name}</strong>,</p>\
         <p>Your account has been created. You can now sign in and book an appointment.</p>\
         <p>If you need help at any point, just reply to this email.</p>"
    );
    (
        "Welcome! Your account has been created".to_string(),
        render_shell("Welcome", &body),
    )
}

/// Confirmation after a new booking. Includes the 48-hour notice.
pub fn booking_confirmation(name: &str, appointment: &AppointmentDetails) -> (String, String) {
    let body = format!(
        "<p>Hello <strong>{name}</strong>,</p>\
         <p>Your appointment has been booked. Here is the summary:</p>{}\
         <div class=\"warning-box\"><p>Appointments can only be changed or cancelled \
         at least <strong>48 hours</strong> in advance.</p></div>",
        appointment_box(appointment)
    );
    (
        format!(
            "Appointment confirmed - {} at {}",
            format_date(appointment.date),
            appointment.time_slot
        ),
        render_shell("Appointment confirmed", &body),
    )
}

/// Confirmation after an edit.
pub fn booking_updated(name: &str, appointment: &AppointmentDetails) -> (String, String) {
    let body = format!(
        "<p>Hello <strong>{name}</strong>,</p>\
         <p>Your appointment has been updated. The new details are:</p>{}",
        appointment_box(appointment)
    );
    (
        format!(
            "Appointment updated - {} at {}",
            format_date(appointment.date),
            appointment.time_slot
        ),
        render_shell("Appointment updated", &body),
    )
}

/// Confirmation after a cancellation.
pub fn booking_cancelled(name: &str, appointment: &AppointmentDetails) -> (String, String) {
    let body = format!(
        "<p>Hello <strong>{name}</strong>,</p>\
         <p>Your appointment on <strong>{}</strong> at <strong>{}</strong> has been \
         cancelled.</p><p>You can book a new appointment whenever suits you.</p>",
        format_date(appointment.date),
        appointment.time_slot
    );
    (
        format!("Appointment cancelled - {}", format_date(appointment.date)),
        render_shell("Appointment cancelled", &body),
    )
}

/// 72-hour reminder.
pub fn reminder(name: &str, appointment: &AppointmentDetails) -> (String, String) {
    let body = format!(
        "<p>Hello <strong>{name}</strong>,</p>\
         <p>This is a reminder that your appointment is coming up in about \
         <strong>72 hours</strong>:</p>{}\
         <div class=\"warning-box\"><p>Changes and cancellations close \
         <strong>48 hours</strong> before the appointment.</p></div>",
        appointment_box(appointment)
    );
    (
        format!(
            "Reminder: appointment on {} at {}",
            format_date(appointment.date),
            appointment.time_slot
        ),
        render_shell("Upcoming appointment", &body),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> AppointmentDetails {
        AppointmentDetails {
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            time_slot: "10:00".to_string(),
            reason: "Follow-up session".to_string(),
            notes: Some("Bring previous notes".to_string()),
        }
    }

    #[test]
    fn format_date_is_day_month_year() {
        assert_eq!(format_date(NaiveDate::from_ymd_opt(2024, 1, 4).unwrap()), "04/01/2024");
    }

    #[test]
    fn confirmation_contains_details_and_cutoff_notice() {
        let (subject, html) = booking_confirmation("Ana", &details());
        assert!(subject.contains("15/03/2024"));
        assert!(subject.contains("10:00"));
        assert!(html.contains("Ana"));
        assert!(html.contains("Follow-up session"));
        assert!(html.contains("Bring previous notes"));
        assert!(html.contains("48 hours"));
    }

    #[test]
    fn notes_section_is_omitted_when_absent() {
        let mut d = details();
        d.notes = None;
        let (_, html) = booking_confirmation("Ana", &d);
        assert!(!html.contains("Notes:"));
    }

    #[test]
    fn reminder_mentions_72_hours() {
        let (subject, html) = reminder("Ana", &details());
        assert!(subject.starts_with("Reminder"));
        assert!(html.contains("72 hours"));
    }

    #[test]
    fn cancellation_names_the_cancelled_date() {
        let (subject, html) = booking_cancelled("Ana", &details());
        assert!(subject.contains("15/03/2024"));
        assert!(html.contains("cancelled"));
    }

    #[test]
    fn welcome_greets_by_name() {
        let (subject, html) = welcome("Ana");
        assert!(subject.contains("Welcome"));
        assert!(html.contains("<strong>Ana</strong>"));
    }
}
