//! Long-polling bot loop.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{error, info, warn};

use crate::answerer::QueryService;

use super::api::{ChatApi, TelegramError};
use super::router::{PERMISSION_DENIED, Route, Router};
use super::types::{Message, ReplyMarkup, SendMessage, Update};

/// Reply sent when the answer backend could not produce an answer.
pub const BACKEND_FAILURE_REPLY: &str = "抱歉，暂时无法获取答案，请稍后再试。";

/// Pause after a failed `getUpdates` call.
const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(3);

/// Relays chat messages to the query service.
pub struct Bot {
    api: Arc<dyn ChatApi>,
    service: Arc<QueryService>,
    router: Router,
    poll_backoff: Duration,
}

impl Bot {
    pub fn new(api: Arc<dyn ChatApi>, service: Arc<QueryService>, router: Router) -> Self {
        Self {
            api,
            service,
            router,
            poll_backoff: POLL_ERROR_BACKOFF,
        }
    }

    /// Overrides the pause after a failed `getUpdates` call.
    #[must_use]
    pub fn with_poll_backoff(mut self, backoff: Duration) -> Self {
        self.poll_backoff = backoff;
        self
    }

    /// Polls forever, handling each message on its own thread.
    ///
    /// Returns only if the initial `getMe` call fails. A failed `getUpdates`
    /// is logged and retried after a pause.
    pub fn run(self) -> Result<(), TelegramError> {
        let bot = self.start()?;

        let mut offset = 0;
        loop {
            match bot.poll_once(offset) {
                Ok(next) => offset = next,
                Err(e) => {
                    warn!(error = %e, "getUpdates failed");
                    thread::sleep(bot.poll_backoff);
                }
            }
        }
    }

    /// Calls `getMe` and returns the bot ready to poll.
    ///
    /// When no bot name was configured, the username reported by `getMe` is
    /// used for mentions.
    pub fn start(self) -> Result<Arc<Self>, TelegramError> {
        let me = self.api.get_me()?;
        let username = me.username.unwrap_or_default();
        let bot = Arc::new(Self {
            router: self.router.with_default_bot_name(&username),
            ..self
        });
        info!(bot = %username, mention = %bot.router.bot_name(), "bot started");
        Ok(bot)
    }

    /// Fetches one batch of updates from `offset`, dispatches it and returns
    /// the next offset.
    pub fn poll_once(self: &Arc<Self>, offset: i64) -> Result<i64, TelegramError> {
        let updates = self.api.get_updates(offset)?;
        let (next, _) = self.dispatch(updates, offset);
        Ok(next)
    }

    /// Spawns a handler thread per message and returns the next offset.
    pub fn dispatch(self: &Arc<Self>, updates: Vec<Update>, offset: i64) -> (i64, Vec<JoinHandle<()>>) {
        let mut next = offset;
        let mut handles = Vec::new();

        for update in updates {
            next = next.max(update.update_id + 1);
            let Some(message) = update.message else {
                continue;
            };

            let bot = Arc::clone(self);
            handles.push(thread::spawn(move || {
                if let Err(e) = bot.handle_message(&message) {
                    error!(chat_id = message.chat.id, error = %e, "failed to reply");
                }
            }));
        }

        (next, handles)
    }

    /// Routes one message and sends the reply, if any.
    pub fn handle_message(&self, message: &Message) -> Result<(), TelegramError> {
        let reply = match self.router.route(message) {
            Route::Ignore => return Ok(()),
            Route::Deny => {
                info!(chat_id = message.chat.id, "chat not in allow-list");
                SendMessage::text_reply(message, PERMISSION_DENIED)
            }
            Route::Greet { html } => SendMessage::html_reply(message, html)
                .with_markup(ReplyMarkup::selective_force_reply()),
            Route::Ask { query } => {
                info!(chat_id = message.chat.id, %query, "query");
                match self.service.ask(&query) {
                    Ok(answer) => return self.send_answer(message, answer),
                    Err(e) => {
                        error!(chat_id = message.chat.id, error = %e, "query failed");
                        SendMessage::text_reply(message, BACKEND_FAILURE_REPLY)
                    }
                }
            }
        };

        self.api.send_message(&reply)
    }

    /// Sends an answer as HTML, falling back to plain text when Telegram
    /// rejects the markup.
    fn send_answer(&self, message: &Message, answer: String) -> Result<(), TelegramError> {
        let reply = SendMessage::html_reply(message, answer).without_link_preview();
        match self.api.send_message(&reply) {
            Err(TelegramError::Api { description }) => {
                warn!(chat_id = message.chat.id, %description, "HTML reply rejected, resending as plain text");
                self.api.send_message(&SendMessage {
                    parse_mode: None,
                    ..reply
                })
            }
            result => result,
        }
    }
}
