//! Push notifications about new or changed books via Pushover.

use crate::amazon::Book;
use crate::config::{Config, Credentials};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, error, info};
use wreq::Client;

/// Trait for delivering a push message - enables mocking for tests.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends one message with the given title.
    async fn send(&self, title: &str, message: &str) -> Result<()>;
}

/// Formats the message body: one "<title> - <release date>" line per book.
pub fn format_message(books: &[Book]) -> String {
    books.iter().map(Book::summary_line).collect::<Vec<_>>().join("\n")
}

/// Notifies about `books`, titled with the author's name.
///
/// Delivery failures are logged and otherwise ignored.
pub async fn notify(notifier: &impl Notifier, author: &str, books: &[Book]) {
    if books.is_empty() {
        return;
    }

    info!("Sending pushover message");
    if let Err(e) = notifier.send(author, &format_message(books)).await {
        error!("Sending pushover message failed with error: {:#}", e);
    }
}

/// Pushover API client.
pub struct PushoverClient {
    client: Client,
    endpoint: String,
    credentials: Credentials,
}

impl PushoverClient {
    /// Creates a new Pushover client.
    pub fn new(config: &Config, credentials: Credentials) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, endpoint: config.pushover_url.clone(), credentials })
    }
}

#[async_trait]
impl Notifier for PushoverClient {
    async fn send(&self, title: &str, message: &str) -> Result<()> {
        debug!("POST {} (title: {})", self.endpoint, title);

        let form = [
            ("title", title),
            ("message", message),
            ("user", self.credentials.user.as_str()),
            ("token", self.credentials.token.as_str()),
        ];

        let response = self
            .client
            .post(self.endpoint.as_str())
            .header("User-Agent", concat!("amz-book-tracker/", env!("CARGO_PKG_VERSION")))
            .form(&form)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Pushover returned status: {} {}", status, body.trim());
        }

        Ok(())
    }
}
