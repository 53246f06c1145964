//! Notetaker-specific error types.

use meetingpost_core::error::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotetakerError {
    #[error("No meeting link found on event: {0}")]
    NoJoinUrl(String),

    #[error("Recall API key is not configured")]
    MissingApiKey,

    #[error("Recall rejected the API credentials")]
    Unauthorized,

    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    #[error("Bot not found: {0}")]
    BotNotFound(String),

    #[error("Bot API error: {0}")]
    BotApi(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl NotetakerError {
    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> String {
        match self {
            Self::NoJoinUrl(_) => {
                "This event has no recognizable meeting link to join.".to_string()
            }
            Self::MissingApiKey => "Recall API key is missing. Check your settings.".to_string(),
            Self::Unauthorized => "Recall API key was rejected. Check your settings.".to_string(),
            Self::RateLimited(secs) => format!("Too many requests. Please wait {} seconds.", secs),
            Self::BotNotFound(_) => "This bot no longer exists.".to_string(),
            Self::BotApi(msg) => format!("Bot service error: {}", msg),
            Self::Storage(e) => e.user_message().to_string(),
            Self::Network(_) => "Network error. Check your connection.".to_string(),
        }
    }

    /// Whether this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited(_) | Self::Network(_))
    }
}
