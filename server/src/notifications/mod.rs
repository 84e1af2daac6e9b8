//! Notifications
//!
//! Best-effort side channel fired after a submission transition commits.
//! Delivery is detached from the request; channel failures are logged and
//! never reach the caller.

mod chat;
mod dispatcher;
mod email;

pub use chat::ChatWebhookChannel;
pub use dispatcher::NotificationDispatcher;
pub use email::{EmailChannel, EmailService};

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::submissions::Submission;

/// Submission events that can trigger a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationEvent {
    SubmissionCreated,
    SubmissionApproved,
    SubmissionRejected,
    SubmissionFeatured,
    SubmissionPublished,
    SubmissionUnpublished,
}

impl NotificationEvent {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SubmissionCreated => "submission_created",
            Self::SubmissionApproved => "submission_approved",
            Self::SubmissionRejected => "submission_rejected",
            Self::SubmissionFeatured => "submission_featured",
            Self::SubmissionPublished => "submission_published",
            Self::SubmissionUnpublished => "submission_unpublished",
        }
    }
}

/// A notification about one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub event: NotificationEvent,
    pub submission_id: Uuid,
    pub title: String,
    pub owner_id: Uuid,
    /// Recipient for owner-facing channels, if known.
    pub owner_email: Option<String>,
    pub rejection_reason: Option<String>,
    /// Absolute link to the submission, if a public base URL is configured.
    pub link: Option<String>,
}

impl Notification {
    #[must_use]
    pub fn for_submission(event: NotificationEvent, submission: &Submission) -> Self {
        Self {
            event,
            submission_id: submission.id,
            title: submission.title.clone(),
            owner_id: submission.owner_id,
            owner_email: None,
            rejection_reason: submission.rejection_reason.clone(),
            link: None,
        }
    }

    #[must_use]
    pub fn with_owner_email(mut self, email: impl Into<String>) -> Self {
        self.owner_email = Some(email.into());
        self
    }

    #[must_use]
    pub fn with_link(mut self, base_url: &str) -> Self {
        self.link = Some(format!(
            "{}/submissions/{}",
            base_url.trim_end_matches('/'),
            self.submission_id
        ));
        self
    }
}

/// A delivery channel.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Channel name used in logs.
    fn name(&self) -> &'static str;

    /// Whether this channel wants `event` at all.
    fn accepts(&self, event: NotificationEvent) -> bool;

    /// Deliver once. No retries.
    async fn deliver(&self, notification: &Notification) -> anyhow::Result<()>;
}
