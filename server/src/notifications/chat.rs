//! Chat webhook channel (Discord-compatible payloads).

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;

use super::{Notification, NotificationChannel, NotificationEvent};

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Embed colors.
const COLOR_PENDING: u32 = 0x00F5_A623;
const COLOR_APPROVED: u32 = 0x002E_CC71;
const COLOR_HIDDEN: u32 = 0x0095_A5A6;

#[derive(Debug, Serialize)]
struct WebhookPayload {
    content: String,
    embeds: Vec<Embed>,
}

#[derive(Debug, Serialize)]
struct Embed {
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    color: u32,
}

/// Posts staff-facing notices to a chat webhook.
pub struct ChatWebhookChannel {
    url: String,
    client: reqwest::Client,
}

impl ChatWebhookChannel {
    pub fn new(url: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .context("Failed to build webhook HTTP client")?;
        Ok(Self { url, client })
    }
}

fn payload(notification: &Notification) -> Option<WebhookPayload> {
    let (content, color) = match notification.event {
        NotificationEvent::SubmissionCreated => ("New submission awaiting review", COLOR_PENDING),
        NotificationEvent::SubmissionApproved => ("Submission approved", COLOR_APPROVED),
        NotificationEvent::SubmissionPublished => ("Submission published", COLOR_APPROVED),
        NotificationEvent::SubmissionUnpublished => ("Submission unpublished", COLOR_HIDDEN),
        _ => return None,
    };

    Some(WebhookPayload {
        content: content.to_string(),
        embeds: vec![Embed {
            title: notification.title.clone(),
            url: notification.link.clone(),
            color,
        }],
    })
}

#[async_trait]
impl NotificationChannel for ChatWebhookChannel {
    fn name(&self) -> &'static str {
        "chat_webhook"
    }

    fn accepts(&self, event: NotificationEvent) -> bool {
        matches!(
            event,
            NotificationEvent::SubmissionCreated
                | NotificationEvent::SubmissionApproved
                | NotificationEvent::SubmissionPublished
                | NotificationEvent::SubmissionUnpublished
        )
    }

    async fn deliver(&self, notification: &Notification) -> Result<()> {
        let Some(body) = payload(notification) else {
            return Ok(());
        };

        self.client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .context("Webhook request failed")?
            .error_for_status()
            .context("Webhook endpoint returned an error status")?;
        Ok(())
    }
}
