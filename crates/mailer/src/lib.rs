//! Transactional email delivery via SMTP.
//!
//! All mail is best-effort: callers on the HTTP path spawn sends and only
//! log failures, and the reminder sweep isolates failures per appointment.
//! When SMTP is not configured the mailer runs in disabled mode and logs
//! what it would have sent, so local development needs no mail server.

use chrono::NaiveDate;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

pub mod templates;

/// Errors raised while configuring or using the SMTP transport.
#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("Mailer configuration error: {0}")]
    Config(String),

    #[error("Invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Recipient rejected: {0}")]
    Rejected(String),
}

/// Who an email is addressed to.
#[derive(Debug, Clone)]
pub struct Recipient {
    pub name: String,
    pub email: String,
}

/// The appointment fields that appear in email bodies.
#[derive(Debug, Clone)]
pub struct AppointmentDetails {
    pub date: NaiveDate,
    pub time_slot: String,
    pub reason: String,
    pub notes: Option<String>,
}

/// How outgoing mail is delivered.
enum Transport {
    /// Real SMTP delivery.
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    /// Sends are logged and dropped.
    Disabled,
    /// Sends to the given address fail; everything else is dropped.
    /// Lets callers exercise their send-failure handling.
    Rejecting(String),
}

/// Async SMTP mailer for the practice's transactional email.
pub struct Mailer {
    transport: Transport,
    from: Mailbox,
}

/// Fallback sender identity used in disabled mode.
const DEFAULT_FROM: &str = "Consulta <no-reply@localhost>";

impl Mailer {
    /// Build the mailer from environment variables.
    ///
    /// | Env Var         | Required | Default |
    /// |-----------------|----------|---------|
    /// | `SMTP_HOST`     | no       | -- (disabled mode when unset) |
    /// | `SMTP_PORT`     | no       | `587`   |
    /// | `SMTP_USERNAME` | no       | --      |
    /// | `SMTP_PASSWORD` | no       | --      |
    /// | `MAIL_FROM`     | when SMTP_HOST set | `Consulta <no-reply@localhost>` |
    pub fn from_env() -> Result<Self, MailerError> {
        let from: Mailbox = std::env::var("MAIL_FROM")
            .unwrap_or_else(|_| DEFAULT_FROM.into())
            .parse()?;

        let Ok(host) = std::env::var("SMTP_HOST") else {
            tracing::warn!("SMTP_HOST not set; mailer running in disabled mode");
            return Ok(Self {
                transport: Transport::Disabled,
                from,
            });
        };

        let port: u16 = std::env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".into())
            .parse()
            .map_err(|_| MailerError::Config("SMTP_PORT must be a valid u16".into()))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&host)
            .map_err(MailerError::Smtp)?
            .port(port);

        if let (Ok(username), Ok(password)) = (
            std::env::var("SMTP_USERNAME"),
            std::env::var("SMTP_PASSWORD"),
        ) {
            builder = builder.credentials(Credentials::new(username, password));
        }

        Ok(Self {
            transport: Transport::Smtp(builder.build()),
            from,
        })
    }

    /// Whether an SMTP transport is configured. Disabled mailers log and drop.
    pub fn is_enabled(&self) -> bool {
        matches!(self.transport, Transport::Smtp(_))
    }

    /// Construct a disabled mailer directly (used by tests).
    pub fn disabled() -> Self {
        Self {
            transport: Transport::Disabled,
            from: DEFAULT_FROM.parse().expect("default sender is valid"),
        }
    }

    /// Construct a mailer whose sends to `address` fail while everything
    /// else is dropped (used by tests to simulate delivery failures).
    pub fn rejecting(address: impl Into<String>) -> Self {
        Self {
            transport: Transport::Rejecting(address.into()),
            from: DEFAULT_FROM.parse().expect("default sender is valid"),
        }
    }

    /// Welcome email after registration.
    pub async fn send_welcome(&self, to: &Recipient) -> Result<(), MailerError> {
        let (subject, html) = templates::welcome(&to.name);
        self.send(to, &subject, html).await
    }

    /// Confirmation after a new booking.
    pub async fn send_booking_confirmation(
        &self,
        to: &Recipient,
        appointment: &AppointmentDetails,
    ) -> Result<(), MailerError> {
        let (subject, html) = templates::booking_confirmation(&to.name, appointment);
        self.send(to, &subject, html).await
    }

    /// Confirmation after an edit.
    pub async fn send_booking_updated(
        &self,
        to: &Recipient,
        appointment: &AppointmentDetails,
    ) -> Result<(), MailerError> {
        let (subject, html) = templates::booking_updated(&to.name, appointment);
        self.send(to, &subject, html).await
    }

    /// Confirmation after a cancellation.
    pub async fn send_booking_cancelled(
        &self,
        to: &Recipient,
        appointment: &AppointmentDetails,
    ) -> Result<(), MailerError> {
        let (subject, html) = templates::booking_cancelled(&to.name, appointment);
        self.send(to, &subject, html).await
    }

    /// 72-hour reminder, sent once per appointment by the sweep.
    pub async fn send_reminder(
        &self,
        to: &Recipient,
        appointment: &AppointmentDetails,
    ) -> Result<(), MailerError> {
        let (subject, html) = templates::reminder(&to.name, appointment);
        self.send(to, &subject, html).await
    }

    async fn send(&self, to: &Recipient, subject: &str, html: String) -> Result<(), MailerError> {
        let transport = match &self.transport {
            Transport::Smtp(transport) => transport,
            Transport::Disabled => {
                tracing::info!(to = %to.email, subject, "Mailer disabled; dropping email");
                return Ok(());
            }
            Transport::Rejecting(address) => {
                if to.email == *address {
                    return Err(MailerError::Rejected(to.email.clone()));
                }
                tracing::info!(to = %to.email, subject, "Mailer disabled; dropping email");
                return Ok(());
            }
        };

        let to_mailbox = Mailbox::new(Some(to.name.clone()), to.email.parse()?);

        let message = Message::builder()
            .from(self.from.clone())
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html)?;

        transport.send(message).await?;
        Ok(())
    }
}
