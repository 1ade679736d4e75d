//! The subset of Telegram Bot API types the bot reads and writes.

use serde::{Deserialize, Serialize};

use crate::answerer::escape_html;

/// Bot API response envelope.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl User {
    /// First and last name joined by a space.
    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }

    /// An HTML link that mentions this user.
    pub fn mention_html(&self) -> String {
        format!(
            "<a href=\"tg://user?id={}\">{}</a>",
            self.id,
            escape_html(&self.full_name())
        )
    }
}

/// Reply markup attached to an outbound message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReplyMarkup {
    ForceReply { force_reply: bool, selective: bool },
}

impl ReplyMarkup {
    /// Asks only the replied-to user's client to open a reply box.
    pub fn selective_force_reply() -> Self {
        ReplyMarkup::ForceReply {
            force_reply: true,
            selective: true,
        }
    }
}

/// Body of a `sendMessage` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendMessage {
    pub chat_id: i64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub disable_web_page_preview: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyMarkup>,
}

impl SendMessage {
    /// Plain-text reply to `message`.
    pub fn text_reply(message: &Message, text: impl Into<String>) -> Self {
        Self {
            chat_id: message.chat.id,
            text: text.into(),
            parse_mode: None,
            disable_web_page_preview: false,
            reply_to_message_id: Some(message.message_id),
            reply_markup: None,
        }
    }

    /// HTML reply to `message`.
    pub fn html_reply(message: &Message, html: impl Into<String>) -> Self {
        Self {
            parse_mode: Some("HTML"),
            ..Self::text_reply(message, html)
        }
    }

    pub fn without_link_preview(mut self) -> Self {
        self.disable_web_page_preview = true;
        self
    }

    pub fn with_markup(mut self, markup: ReplyMarkup) -> Self {
        self.reply_markup = Some(markup);
        self
    }
}

/// Body of a `getUpdates` call.
#[derive(Debug, Clone, Serialize)]
pub struct GetUpdates {
    pub offset: i64,
    pub timeout: u32,
    pub allowed_updates: &'static [&'static str],
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> Message {
        Message {
            message_id: 10,
            chat: Chat { id: -100 },
            from: None,
            text: Some("hi".to_string()),
        }
    }

    #[test]
    fn decodes_update_with_text_message() {
        let update: Update = serde_json::from_str(
            r#"{
                "update_id": 5,
                "message": {
                    "message_id": 10,
                    "date": 1700000000,
                    "chat": {"id": -100, "type": "group"},
                    "from": {"id": 7, "is_bot": false, "first_name": "Ada", "last_name": "L"},
                    "text": "@bot hello"
                }
            }"#,
        )
        .unwrap();

        let message = update.message.unwrap();
        assert_eq!(update.update_id, 5);
        assert_eq!(message.chat.id, -100);
        assert_eq!(message.text.as_deref(), Some("@bot hello"));
        assert_eq!(message.from.unwrap().full_name(), "Ada L");
    }

    #[test]
    fn decodes_update_without_message() {
        let update: Update =
            serde_json::from_str(r#"{"update_id": 6, "edited_message": {}}"#).unwrap();
        assert!(update.message.is_none());
    }

    #[test]
    fn mention_html_escapes_name() {
        let user = User {
            id: 7,
            first_name: "<Ada>".to_string(),
            last_name: None,
            username: None,
        };
        assert_eq!(user.mention_html(), "<a href=\"tg://user?id=7\">&lt;Ada&gt;</a>");

        let user = User {
            last_name: Some("& \"Co\"".to_string()),
            ..user
        };
        assert_eq!(
            user.mention_html(),
            "<a href=\"tg://user?id=7\">&lt;Ada&gt; &amp; &quot;Co&quot;</a>"
        );
    }

    #[test]
    fn html_reply_serializes_expected_fields() {
        let body = SendMessage::html_reply(&message(), "<b>x</b>").without_link_preview();

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "chat_id": -100,
                "text": "<b>x</b>",
                "parse_mode": "HTML",
                "disable_web_page_preview": true,
                "reply_to_message_id": 10
            })
        );
    }

    #[test]
    fn force_reply_markup_serializes_flat() {
        let body = SendMessage::html_reply(&message(), "Hi")
            .with_markup(ReplyMarkup::selective_force_reply());
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(
            json["reply_markup"],
            serde_json::json!({"force_reply": true, "selective": true})
        );
        assert!(json.get("disable_web_page_preview").is_none());
    }

    #[test]
    fn error_envelope_decodes() {
        let response: ApiResponse<Vec<Update>> =
            serde_json::from_str(r#"{"ok": false, "error_code": 401, "description": "Unauthorized"}"#)
                .unwrap();
        assert!(!response.ok);
        assert!(response.result.is_none());
        assert_eq!(response.description.as_deref(), Some("Unauthorized"));
    }
}
