//! Messaging
//!
//! Opening a prefilled WhatsApp conversation is the last step of a submission. From the
//! ordering core's point of view it is fire-and-forget: a failure is reported but never
//! undoes the stored order.

use std::fmt;

use async_trait::async_trait;
use mockall::automock;
use reqwest::Url;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

const WHATSAPP_BASE: &str = "https://wa.me/";

/// Messaging errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MessagingError {
    /// The phone number is not usable in a conversation link.
    #[error("invalid WhatsApp number: {0:?}")]
    InvalidNumber(String),

    /// The conversation link could not be built.
    #[error("invalid conversation link: {0}")]
    InvalidLink(String),

    /// The conversation could not be opened.
    #[error("failed to open conversation: {0}")]
    Unavailable(String),
}

/// A prefilled conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationLink {
    number: String,
    text: String,
    url: Url,
}

impl ConversationLink {
    /// Builds a `wa.me` link to `number` carrying `text`.
    ///
    /// The number is in international format; a leading `+` is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingError::InvalidNumber`] if the number is empty or contains
    /// anything other than digits.
    pub fn whatsapp(number: &str, text: impl Into<String>) -> Result<Self, MessagingError> {
        let trimmed = number.trim();
        let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);

        if digits.is_empty() || !digits.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(MessagingError::InvalidNumber(number.to_string()));
        }

        let text = text.into();

        let mut url = Url::parse(WHATSAPP_BASE)
            .and_then(|base| base.join(digits))
            .map_err(|error| MessagingError::InvalidLink(error.to_string()))?;

        url.query_pairs_mut().append_pair("text", &text);

        Ok(Self {
            number: digits.to_string(),
            text,
            url,
        })
    }

    /// Recipient number, digits only.
    pub fn number(&self) -> &str {
        &self.number
    }

    /// Prefilled message text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The link to open.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl fmt::Display for ConversationLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// Opens prefilled conversations.
#[automock]
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Opens `link`.
    async fn open(&self, link: &ConversationLink) -> Result<(), MessagingError>;
}

/// Messenger for headless hosts: logs the link and keeps it for the caller to show.
#[derive(Debug, Default)]
pub struct LogMessenger {
    opened: Mutex<Vec<ConversationLink>>,
}

impl LogMessenger {
    /// Creates a messenger with no opened links.
    pub fn new() -> Self {
        Self::default()
    }

    /// Links opened so far, oldest first.
    pub async fn opened(&self) -> Vec<ConversationLink> {
        self.opened.lock().await.clone()
    }
}

#[async_trait]
impl Messenger for LogMessenger {
    async fn open(&self, link: &ConversationLink) -> Result<(), MessagingError> {
        info!(number = link.number(), url = %link.url(), "conversation ready");

        self.opened.lock().await.push(link.clone());

        Ok(())
    }
}
