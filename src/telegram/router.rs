//! Decides what to do with an inbound message.

use crate::config::AllowList;

use super::types::Message;

/// Reply sent to chats outside the allow-list.
pub const PERMISSION_DENIED: &str = "很抱歉，你没有权限使用这个机器人。";

/// The action for one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Reply with an HTML greeting and a force-reply prompt.
    Greet { html: String },
    /// Forward `query` to the answer backend.
    Ask { query: String },
    /// Tell the chat it may not use the bot.
    Deny,
    /// Do nothing.
    Ignore,
}

/// Routes messages by command, mention and allow-list.
#[derive(Debug, Clone)]
pub struct Router {
    bot_name: String,
    allow_list: AllowList,
}

impl Router {
    pub fn new(bot_name: impl Into<String>, allow_list: AllowList) -> Self {
        Self {
            bot_name: bot_name.into(),
            allow_list,
        }
    }

    pub fn bot_name(&self) -> &str {
        &self.bot_name
    }

    /// Fills in the bot name when none was configured.
    pub fn with_default_bot_name(mut self, name: &str) -> Self {
        if self.bot_name.is_empty() {
            self.bot_name = name.to_string();
        }
        self
    }

    /// Routes one message.
    ///
    /// `/start` greets and `/help <query>` asks, in any chat. Other text asks
    /// only when it mentions the bot, and chats outside a non-empty
    /// allow-list are denied before the mention is checked.
    pub fn route(&self, message: &Message) -> Route {
        let Some(text) = message.text.as_deref() else {
            return Route::Ignore;
        };

        if let Some((command, rest)) = self.parse_command(text) {
            return match command {
                Some("start") => Route::Greet {
                    html: match &message.from {
                        Some(user) => format!("Hi {}!", user.mention_html()),
                        None => "Hi!".to_string(),
                    },
                },
                Some("help") => Route::Ask {
                    query: rest.trim().to_string(),
                },
                _ => Route::Ignore,
            };
        }

        if !self.allow_list.permits(message.chat.id) {
            return Route::Deny;
        }

        if self.bot_name.is_empty() {
            return Route::Ignore;
        }

        let mention = format!("@{}", self.bot_name);
        if text.contains(&mention) {
            Route::Ask {
                query: text.replace(&mention, "").trim().to_string(),
            }
        } else {
            Route::Ignore
        }
    }

    /// Splits a leading `/command[@bot]` token off `text`.
    ///
    /// Returns `None` for plain text. The command is `None` when it is
    /// addressed to a different bot.
    fn parse_command<'a>(&self, text: &'a str) -> Option<(Option<&'a str>, &'a str)> {
        let body = text.strip_prefix('/')?;
        let end = body.find(char::is_whitespace).unwrap_or(body.len());
        let (token, rest) = body.split_at(end);

        let command = match token.split_once('@') {
            Some((name, target))
                if self.bot_name.is_empty() || target.eq_ignore_ascii_case(&self.bot_name) =>
            {
                Some(name)
            }
            Some(_) => None,
            None => Some(token),
        };
        Some((command, rest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telegram::types::{Chat, User};

    fn message(chat_id: i64, text: &str) -> Message {
        Message {
            message_id: 1,
            chat: Chat { id: chat_id },
            from: Some(User {
                id: 99,
                first_name: "Ada".to_string(),
                last_name: Some("Lovelace".to_string()),
                username: None,
            }),
            text: Some(text.to_string()),
        }
    }

    fn router() -> Router {
        Router::new("docs_bot", AllowList::parse("42"))
    }

    fn ask(query: &str) -> Route {
        Route::Ask {
            query: query.to_string(),
        }
    }

    #[test]
    fn start_greets_sender() {
        assert_eq!(
            router().route(&message(42, "/start")),
            Route::Greet {
                html: "Hi <a href=\"tg://user?id=99\">Ada Lovelace</a>!".to_string()
            }
        );
    }

    #[test]
    fn start_without_sender_greets_plainly() {
        let mut msg = message(42, "/start");
        msg.from = None;
        assert_eq!(
            router().route(&msg),
            Route::Greet {
                html: "Hi!".to_string()
            }
        );
    }

    #[test]
    fn help_forwards_remainder() {
        assert_eq!(router().route(&message(42, "/help  what is rust? ")), ask("what is rust?"));
    }

    #[test]
    fn help_addressed_to_this_bot_forwards_remainder() {
        assert_eq!(router().route(&message(42, "/help@docs_bot why")), ask("why"));
    }

    #[test]
    fn bare_help_forwards_empty_query() {
        assert_eq!(router().route(&message(42, "/help")), ask(""));
    }

    #[test]
    fn help_is_not_gated_by_allow_list() {
        assert_eq!(router().route(&message(7, "/help hi")), ask("hi"));
    }

    #[test]
    fn command_for_another_bot_is_ignored() {
        assert_eq!(router().route(&message(42, "/help@other_bot hi")), Route::Ignore);
    }

    #[test]
    fn unknown_command_is_ignored() {
        assert_eq!(router().route(&message(42, "/settings")), Route::Ignore);
    }

    #[test]
    fn mention_is_stripped_and_forwarded() {
        assert_eq!(
            router().route(&message(42, "@docs_bot how do I deploy?")),
            ask("how do I deploy?")
        );
        assert_eq!(
            router().route(&message(42, "how do I deploy @docs_bot")),
            ask("how do I deploy")
        );
    }

    #[test]
    fn text_without_mention_is_ignored() {
        assert_eq!(router().route(&message(42, "just chatting")), Route::Ignore);
    }

    #[test]
    fn disallowed_chat_is_denied() {
        assert_eq!(router().route(&message(7, "@docs_bot hi")), Route::Deny);
        assert_eq!(router().route(&message(7, "no mention")), Route::Deny);
    }

    #[test]
    fn empty_allow_list_permits_every_chat() {
        let router = Router::new("docs_bot", AllowList::default());
        assert_eq!(router.route(&message(12345, "@docs_bot hi")), ask("hi"));
    }

    #[test]
    fn empty_bot_name_never_matches_mentions() {
        let router = Router::new("", AllowList::default());
        assert_eq!(router.route(&message(1, "mail me @ home")), Route::Ignore);
    }

    #[test]
    fn default_bot_name_fills_only_when_unset() {
        let router = Router::new("", AllowList::default()).with_default_bot_name("from_get_me");
        assert_eq!(router.bot_name(), "from_get_me");

        let router = Router::new("configured", AllowList::default()).with_default_bot_name("x");
        assert_eq!(router.bot_name(), "configured");
    }

    #[test]
    fn message_without_text_is_ignored() {
        let mut msg = message(42, "");
        msg.text = None;
        assert_eq!(router().route(&msg), Route::Ignore);
    }
}
