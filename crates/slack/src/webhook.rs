//! Slack incoming-webhook delivery.

use std::time::Duration;

use async_trait::async_trait;
use pipeline::config::Secret;
use pipeline::errors::truncate_body;
use pipeline::{Notifier, NotifyError};
use serde::Serialize;
use tracing::{info, instrument, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Posts messages to one incoming-webhook URL.
///
/// The URL is itself the credential, so it is held as a [`Secret`] and never
/// logged.
pub struct SlackWebhook {
    client: reqwest::Client,
    url: Secret,
}

impl SlackWebhook {
    #[must_use]
    pub fn new(url: Secret) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    #[must_use]
    pub fn with_client(client: reqwest::Client, url: Secret) -> Self {
        Self { client, url }
    }
}

#[derive(Debug, Serialize)]
struct Payload<'a> {
    text: &'a str,
    unfurl_links: bool,
    unfurl_media: bool,
}

#[async_trait]
impl Notifier for SlackWebhook {
    #[instrument(skip_all, fields(chars = text.chars().count()))]
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let payload = Payload {
            text,
            unfurl_links: false,
            unfurl_media: false,
        };
        let response = self
            .client
            .post(self.url.expose())
            .json(&payload)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| NotifyError::Transport {
                message: e.without_url().to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "webhook rejected message");
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body: truncate_body(&body, 200),
            });
        }

        info!("notification delivered");
        Ok(())
    }
}
