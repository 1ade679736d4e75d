/// Telegram front end.
///
/// This module provides a blocking Bot API client, the message types it
/// exchanges, a router that decides how to answer each message, and the
/// long-polling loop that ties them to the query service.
mod api;
mod bot;
mod router;
mod types;

pub use api::{ChatApi, DEFAULT_API_URL, POLL_TIMEOUT_SECS, TelegramApi, TelegramError};
pub use bot::{BACKEND_FAILURE_REPLY, Bot};
pub use router::{PERMISSION_DENIED, Route, Router};
pub use types::{Chat, Message, ReplyMarkup, SendMessage, Update, User};
