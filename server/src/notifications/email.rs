//! Email Channel
//!
//! SMTP delivery of owner-facing moderation notices.

use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{Notification, NotificationChannel, NotificationEvent};
use crate::config::Config;

/// Thin SMTP client.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: Mailbox,
}

impl EmailService {
    /// Create a new email service from server configuration.
    ///
    /// Requires SMTP to be fully configured (`config.has_smtp()` must be true).
    pub fn new(config: &Config) -> Result<Self> {
        let host = config.smtp_host.as_ref().context("SMTP_HOST is required")?;
        let username = config
            .smtp_username
            .as_ref()
            .context("SMTP_USERNAME is required")?;
        let password = config
            .smtp_password
            .as_ref()
            .context("SMTP_PASSWORD is required")?;
        let from = config.smtp_from.as_ref().context("SMTP_FROM is required")?;

        let from_address: Mailbox = from
            .parse()
            .context("SMTP_FROM is not a valid email address")?;

        let creds = Credentials::new(username.clone(), password.clone());

        let mailer = match config.smtp_tls.as_str() {
            "tls" => AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                .context("Failed to create SMTP TLS transport")?
                .port(config.smtp_port)
                .credentials(creds)
                .build(),
            "none" => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
                .port(config.smtp_port)
                .credentials(creds)
                .build(),
            _ => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .context("Failed to create SMTP STARTTLS transport")?
                .port(config.smtp_port)
                .credentials(creds)
                .build(),
        };

        Ok(Self {
            mailer,
            from_address,
        })
    }

    /// Send one plain-text message.
    pub async fn send(&self, to_email: &str, subject: &str, body: String) -> Result<()> {
        let to_mailbox: Mailbox = to_email
            .parse()
            .context("Invalid recipient email address")?;

        let email = Message::builder()
            .from(self.from_address.clone())
            .to(to_mailbox)
            .subject(subject)
            .body(body)
            .context("Failed to build email message")?;

        self.mailer
            .send(email)
            .await
            .context("Failed to send email via SMTP")?;

        Ok(())
    }
}

/// Emails the submission owner when a moderator acts on their work.
pub struct EmailChannel {
    service: EmailService,
}

impl EmailChannel {
    #[must_use]
    pub const fn new(service: EmailService) -> Self {
        Self { service }
    }
}

/// Subject and body for an owner notice, or `None` for events owners are not
/// mailed about.
fn compose(notification: &Notification) -> Option<(String, String)> {
    let title = &notification.title;
    let link = notification
        .link
        .as_deref()
        .map(|l| format!("\n{l}\n"))
        .unwrap_or_default();

    let (subject, text) = match notification.event {
        NotificationEvent::SubmissionApproved => (
            format!("\"{title}\" was approved"),
            "Your submission was approved and is now public.".to_string(),
        ),
        NotificationEvent::SubmissionRejected => (
            format!("\"{title}\" needs changes"),
            format!(
                "A moderator rejected your submission.\n\nReason: {}",
                notification.rejection_reason.as_deref().unwrap_or("-")
            ),
        ),
        NotificationEvent::SubmissionFeatured => (
            format!("\"{title}\" is featured"),
            "Your submission was selected to be featured.".to_string(),
        ),
        NotificationEvent::SubmissionUnpublished => (
            format!("\"{title}\" was unpublished"),
            "A moderator took your submission off the public gallery. It stays approved."
                .to_string(),
        ),
        _ => return None,
    };

    Some((subject, format!("Hello,\n\n{text}\n{link}")))
}

#[async_trait]
impl NotificationChannel for EmailChannel {
    fn name(&self) -> &'static str {
        "email"
    }

    fn accepts(&self, event: NotificationEvent) -> bool {
        matches!(
            event,
            NotificationEvent::SubmissionApproved
                | NotificationEvent::SubmissionRejected
                | NotificationEvent::SubmissionFeatured
                | NotificationEvent::SubmissionUnpublished
        )
    }

    async fn deliver(&self, notification: &Notification) -> Result<()> {
        let to = notification
            .owner_email
            .as_deref()
            .context("Owner email unknown")?;
        let Some((subject, body)) = compose(notification) else {
            return Ok(());
        };
        self.service.send(to, &subject, body).await
    }
}
