//! Notification fan-out.

use std::sync::Arc;

use anyhow::Result;
use futures::future::join_all;
use tracing::{debug, info, warn};

use super::{ChatWebhookChannel, EmailChannel, EmailService, Notification, NotificationChannel};
use crate::config::Config;

/// Fans notifications out to every registered channel.
#[derive(Clone, Default)]
pub struct NotificationDispatcher {
    channels: Arc<Vec<Arc<dyn NotificationChannel>>>,
    /// Site root used to link notifications to their submission.
    base_url: Option<Arc<str>>,
}

impl NotificationDispatcher {
    #[must_use]
    pub fn new(channels: Vec<Arc<dyn NotificationChannel>>) -> Self {
        Self {
            channels: Arc::new(channels),
            base_url: None,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = Some(Arc::from(base_url));
        self
    }

    /// Dispatcher with no channels; every notification is dropped.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Register the channels that are configured. Missing ones are skipped.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut channels: Vec<Arc<dyn NotificationChannel>> = Vec::new();

        if config.has_smtp() {
            channels.push(Arc::new(EmailChannel::new(EmailService::new(config)?)));
            info!("Email notifications enabled");
        } else {
            info!("SMTP not configured, email notifications disabled");
        }

        if let Some(url) = &config.chat_webhook_url {
            channels.push(Arc::new(ChatWebhookChannel::new(url.clone())?));
            info!("Chat webhook notifications enabled");
        }

        Ok(Self::new(channels).with_base_url(&config.public_base_url))
    }

    /// Number of registered channels.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Fire and forget: deliver on a detached task and return immediately.
    pub fn notify(&self, mut notification: Notification) {
        if !self.channels.iter().any(|c| c.accepts(notification.event)) {
            debug!(event = notification.event.as_str(), "No channel accepts event");
            return;
        }

        if notification.link.is_none() {
            if let Some(base_url) = &self.base_url {
                notification = notification.with_link(base_url);
            }
        }

        let dispatcher = self.clone();
        tokio::spawn(async move {
            dispatcher.deliver_all(&notification).await;
        });
    }

    /// Deliver to every accepting channel concurrently, one attempt each.
    /// Returns the number of successful deliveries; failures are logged.
    pub async fn deliver_all(&self, notification: &Notification) -> usize {
        let deliveries = self
            .channels
            .iter()
            .filter(|c| c.accepts(notification.event))
            .map(|channel| async move {
                match channel.deliver(notification).await {
                    Ok(()) => {
                        debug!(
                            channel = channel.name(),
                            event = notification.event.as_str(),
                            submission_id = %notification.submission_id,
                            "Notification delivered"
                        );
                        true
                    }
                    Err(e) => {
                        warn!(
                            channel = channel.name(),
                            event = notification.event.as_str(),
                            submission_id = %notification.submission_id,
                            error = %e,
                            "Notification delivery failed"
                        );
                        false
                    }
                }
            });

        join_all(deliveries).await.into_iter().filter(|ok| *ok).count()
    }
}
