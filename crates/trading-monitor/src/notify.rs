//! Notification channels.
//!
//! Every channel implements [`Notifier`]; [`NotificationHub`] fans a rendered
//! event out to all enabled channels on detached tasks so a slow or failing
//! channel never holds up the trading cycle.

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use trading_core::error::NotifyError;
use trading_core::traits::Notifier;
use trading_core::types::Notification;

use crate::TradeEvent;

/// SMTP (STARTTLS) email channel.
pub struct EmailNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    recipients: Vec<Mailbox>,
}

impl EmailNotifier {
    pub fn new(
        smtp_host: &str,
        smtp_port: u16,
        username: &str,
        password: &str,
        recipients: &[String],
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let from: Mailbox = username
            .parse()
            .map_err(|e| NotifyError::Configuration(format!("sender {}: {}", username, e)))?;

        let recipients = recipients
            .iter()
            .map(|r| {
                r.parse::<Mailbox>()
                    .map_err(|e| NotifyError::Configuration(format!("recipient {}: {}", r, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if recipients.is_empty() {
            return Err(NotifyError::Configuration("no email recipients".into()));
        }

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(smtp_host)
            .map_err(|e| NotifyError::Configuration(e.to_string()))?
            .port(smtp_port)
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .timeout(Some(timeout))
            .build();

        Ok(Self {
            transport,
            from,
            recipients,
        })
    }

    fn build_message(&self, notification: &Notification) -> Result<Message, NotifyError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(notification.subject.as_str())
            .header(ContentType::TEXT_HTML);
        for recipient in &self.recipients {
            builder = builder.to(recipient.clone());
        }
        builder
            .body(notification.html_body.clone())
            .map_err(|e| NotifyError::Email(e.to_string()))
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let message = self.build_message(notification)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| NotifyError::Email(e.to_string()))?;
        Ok(())
    }

    fn name(&self) -> &str {
        "email"
    }
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
}

/// Chat channel posting `{"text": ...}` to an incoming-webhook URL.
pub struct ChatNotifier {
    client: Client,
    webhook_url: String,
}

impl ChatNotifier {
    pub fn new(webhook_url: impl Into<String>, timeout: Duration) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Configuration(e.to_string()))?;
        Ok(Self {
            client,
            webhook_url: webhook_url.into(),
        })
    }
}

#[async_trait]
impl Notifier for ChatNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let resp = self
            .client
            .post(&self.webhook_url)
            .json(&WebhookPayload {
                text: &notification.text,
            })
            .send()
            .await
            .map_err(|e| NotifyError::Chat(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Chat(format!("{}: {}", status, text)));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "chat"
    }
}

/// Fan-out over the enabled channels.
#[derive(Clone, Default)]
pub struct NotificationHub {
    channels: Vec<Arc<dyn Notifier>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channel(mut self, channel: Arc<dyn Notifier>) -> Self {
        self.channels.push(channel);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn channel_names(&self) -> Vec<String> {
        self.channels.iter().map(|c| c.name().to_string()).collect()
    }

    /// Render and send on detached tasks; failures are logged only.
    pub fn notify(&self, event: TradeEvent) {
        let notification = Arc::new(event.render());
        debug!(subject = %notification.subject, "Notification queued");

        for channel in &self.channels {
            let channel = Arc::clone(channel);
            let notification = Arc::clone(&notification);
            tokio::spawn(async move {
                deliver_one(channel.as_ref(), &notification).await;
            });
        }
    }
}

async fn deliver_one(channel: &dyn Notifier, notification: &Notification) -> bool {
    match channel.send(notification).await {
        Ok(()) => {
            info!(channel = channel.name(), subject = %notification.subject, "Notification sent");
            true
        }
        Err(e) => {
            warn!(channel = channel.name(), subject = %notification.subject, "Notification failed: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use trading_core::types::Side;

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<Notification>>,
    }

    #[async_trait]
    impl Notifier for Recorder {
        async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(notification.clone());
            Ok(())
        }

        fn name(&self) -> &str {
            "recorder"
        }
    }

    struct Broken;

    #[async_trait]
    impl Notifier for Broken {
        async fn send(&self, _: &Notification) -> Result<(), NotifyError> {
            Err(NotifyError::Chat("unreachable".into()))
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    async fn wait_for_one(recorder: &Recorder) {
        for _ in 0..50 {
            if !recorder.sent.lock().unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    fn opened() -> TradeEvent {
        TradeEvent::TradeOpened {
            side: Side::Buy,
            entry: 50_000.0,
            stop_loss: 49_500.0,
            take_profit: 51_250.0,
        }
    }

    #[tokio::test]
    async fn test_failing_channel_does_not_block_others() {
        let recorder = Arc::new(Recorder::default());
        let hub = NotificationHub::new()
            .with_channel(Arc::new(Broken))
            .with_channel(recorder.clone());

        hub.notify(opened());
        wait_for_one(&recorder).await;

        let sent = recorder.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].subject.starts_with("TRADE OPENED"));
    }

    #[tokio::test]
    async fn test_notify_is_fire_and_forget() {
        let recorder = Arc::new(Recorder::default());
        let hub = NotificationHub::new().with_channel(recorder.clone());

        hub.notify(opened());

        wait_for_one(&recorder).await;
        assert_eq!(recorder.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_hub() {
        let hub = NotificationHub::new();
        assert!(hub.is_empty());
        assert!(hub.channel_names().is_empty());
        hub.notify(opened());
    }

    #[test]
    fn test_email_rejects_bad_addresses() {
        let result = EmailNotifier::new(
            "smtp.example.com",
            587,
            "not an address",
            "pw",
            &["ops@example.com".to_string()],
            Duration::from_secs(5),
        );
        assert!(matches!(result, Err(NotifyError::Configuration(_))));

        let result = EmailNotifier::new(
            "smtp.example.com",
            587,
            "bot@example.com",
            "pw",
            &[],
            Duration::from_secs(5),
        );
        assert!(matches!(result, Err(NotifyError::Configuration(_))));
    }

    #[test]
    fn test_email_message_builds() {
        let notifier = EmailNotifier::new(
            "smtp.example.com",
            587,
            "bot@example.com",
            "pw",
            &["ops@example.com".to_string(), "desk@example.com".to_string()],
            Duration::from_secs(5),
        )
        .unwrap();

        let message = notifier.build_message(&opened().render()).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("text/html"));
        assert!(raw.contains("desk@example.com"));
    }
}
