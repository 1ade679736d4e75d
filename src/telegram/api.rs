//! Blocking Telegram Bot API client.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::types::{ApiResponse, GetUpdates, SendMessage, Update, User};

/// Bot API host used when none is configured.
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Long-poll timeout passed to `getUpdates`, in seconds.
pub const POLL_TIMEOUT_SECS: u32 = 30;

/// Errors returned by the Bot API client.
#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Telegram network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Telegram HTTP error: status {status}")]
    Http { status: u16 },

    #[error("Telegram API error: {description}")]
    Api { description: String },

    #[error("Telegram response could not be decoded: {0}")]
    Decode(#[source] serde_json::Error),
}

impl TelegramError {
    /// Wraps a transport error, dropping the request URL since it embeds the
    /// bot token.
    fn from_transport(error: reqwest::Error) -> Self {
        TelegramError::Network(error.without_url())
    }
}

/// Chat operations the bot needs.
///
/// This trait enables mocking in unit tests.
pub trait ChatApi: Send + Sync {
    /// Returns the bot's own user.
    fn get_me(&self) -> Result<User, TelegramError>;

    /// Long-polls for updates starting at `offset`.
    fn get_updates(&self, offset: i64) -> Result<Vec<Update>, TelegramError>;

    /// Sends a message.
    fn send_message(&self, message: &SendMessage) -> Result<(), TelegramError>;
}

/// Bot API client bound to one bot token.
pub struct TelegramApi {
    client: reqwest::blocking::Client,
    base_url: String,
    token: String,
}

impl TelegramApi {
    /// Creates a client for the public Bot API.
    pub fn new(token: impl Into<String>) -> Result<Self, TelegramError> {
        Self::with_base_url(DEFAULT_API_URL, token)
    }

    /// Creates a client against a custom Bot API host.
    pub fn with_base_url(
        base_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, TelegramError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(u64::from(POLL_TIMEOUT_SECS) + 30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(TelegramError::Network)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn call<B, T>(&self, method: &str, body: &B) -> Result<T, TelegramError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/bot{}/{}", self.base_url, self.token, method);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .map_err(TelegramError::from_transport)?;

        let status = response.status();
        let text = response.text().map_err(TelegramError::from_transport)?;

        let envelope: ApiResponse<T> = match serde_json::from_str(&text) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(TelegramError::Http {
                    status: status.as_u16(),
                });
            }
            Err(e) => return Err(TelegramError::Decode(e)),
        };

        match envelope {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse { description, .. } => Err(TelegramError::Api {
                description: description.unwrap_or_else(|| format!("{method} failed ({status})")),
            }),
        }
    }
}

impl ChatApi for TelegramApi {
    fn get_me(&self) -> Result<User, TelegramError> {
        self.call("getMe", &serde_json::json!({}))
    }

    fn get_updates(&self, offset: i64) -> Result<Vec<Update>, TelegramError> {
        self.call(
            "getUpdates",
            &GetUpdates {
                offset,
                timeout: POLL_TIMEOUT_SECS,
                allowed_updates: &["message"],
            },
        )
    }

    fn send_message(&self, message: &SendMessage) -> Result<(), TelegramError> {
        let _: serde_json::Value = self.call("sendMessage", message)?;
        Ok(())
    }
}
