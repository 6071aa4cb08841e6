use anyhow::Context as _;
use serde::Serialize;

use crate::domain::repository::MailPort;
use crate::domain::types::MailMessage;
use crate::error::ApiError;

/// Payload accepted by the HTTP mail relay.
#[derive(Debug, Serialize)]
struct RelayRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
}

/// Delivers mail by POSTing JSON to a relay endpoint.
#[derive(Clone)]
pub struct HttpMailRelay {
    client: reqwest::Client,
    url: String,
    from: String,
}

impl HttpMailRelay {
    pub fn new(url: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            from: from.into(),
        }
    }

    async fn post(&self, message: &MailMessage) -> anyhow::Result<()> {
        self.client
            .post(&self.url)
            .json(&RelayRequest {
                from: &self.from,
                to: [&message.to],
                subject: &message.subject,
                text: &message.body,
            })
            .send()
            .await
            .context("send mail to relay")?
            .error_for_status()
            .context("mail relay rejected message")?;
        Ok(())
    }
}

/// Outbound mail transport selected from configuration.
#[derive(Clone)]
pub enum MailTransport {
    Relay(HttpMailRelay),
    /// Writes messages to the log instead of sending them.
    Log { from: String },
}

impl MailTransport {
    pub fn from_config(relay_url: Option<&str>, from: &str) -> Self {
        match relay_url {
            Some(url) => Self::Relay(HttpMailRelay::new(url, from)),
            None => Self::Log {
                from: from.to_owned(),
            },
        }
    }
}

impl MailPort for MailTransport {
    async fn send(&self, message: &MailMessage) -> Result<(), ApiError> {
        match self {
            Self::Relay(relay) => relay.post(message).await.map_err(ApiError::MailDelivery),
            Self::Log { from } => {
                tracing::info!(
                    from = %from,
                    to = %message.to,
                    subject = %message.subject,
                    body = %message.body,
                    "mail not sent, no relay configured"
                );
                Ok(())
            }
        }
    }
}
