/// Integration tests for the Telegram Bot API client against a mock server.
use askrelay::telegram::{ChatApi, Message, SendMessage, TelegramApi, TelegramError};
use mockito::Matcher;
use serde_json::json;

const TOKEN: &str = "123:abc";

fn api(server: &mockito::Server) -> TelegramApi {
    TelegramApi::with_base_url(server.url(), TOKEN).expect("Failed to create Telegram client")
}

#[test]
fn get_updates_long_polls_from_offset() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/bot123:abc/getUpdates")
        .match_body(Matcher::Json(json!({
            "offset": 17,
            "timeout": 30,
            "allowed_updates": ["message"]
        })))
        .with_status(200)
        .with_body(
            json!({
                "ok": true,
                "result": [{
                    "update_id": 17,
                    "message": {
                        "message_id": 3,
                        "date": 1700000000,
                        "chat": {"id": 42, "type": "private"},
                        "from": {"id": 9, "is_bot": false, "first_name": "Ada"},
                        "text": "/help hi"
                    }
                }]
            })
            .to_string(),
        )
        .create();

    let updates = api(&server).get_updates(17).unwrap();

    assert_eq!(updates.len(), 1);
    let message = updates[0].message.as_ref().unwrap();
    assert_eq!(message.chat.id, 42);
    assert_eq!(message.text.as_deref(), Some("/help hi"));
    mock.assert();
}

#[test]
fn send_message_posts_html_reply() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/bot123:abc/sendMessage")
        .match_body(Matcher::Json(json!({
            "chat_id": 42,
            "text": "<b>hi</b>",
            "parse_mode": "HTML",
            "disable_web_page_preview": true,
            "reply_to_message_id": 3
        })))
        .with_status(200)
        .with_body(r#"{"ok": true, "result": {"message_id": 4}}"#)
        .create();

    let message: Message = serde_json::from_value(json!({
        "message_id": 3,
        "chat": {"id": 42}
    }))
    .unwrap();

    api(&server)
        .send_message(&SendMessage::html_reply(&message, "<b>hi</b>").without_link_preview())
        .unwrap();
    mock.assert();
}

#[test]
fn get_me_returns_bot_username() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("POST", "/bot123:abc/getMe")
        .with_status(200)
        .with_body(r#"{"ok": true, "result": {"id": 1, "is_bot": true, "first_name": "Docs", "username": "docs_bot"}}"#)
        .create();

    let me = api(&server).get_me().unwrap();
    assert_eq!(me.username.as_deref(), Some("docs_bot"));
}

#[test]
fn api_error_surfaces_description() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("POST", "/bot123:abc/getMe")
        .with_status(401)
        .with_body(r#"{"ok": false, "error_code": 401, "description": "Unauthorized"}"#)
        .create();

    let error = api(&server).get_me().unwrap_err();

    match error {
        TelegramError::Api { description } => assert_eq!(description, "Unauthorized"),
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[test]
fn non_json_error_page_maps_to_http_error() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("POST", "/bot123:abc/getUpdates")
        .with_status(502)
        .with_body("<html>Bad Gateway</html>")
        .create();

    let error = api(&server).get_updates(0).unwrap_err();
    assert!(matches!(error, TelegramError::Http { status: 502 }));
}

#[test]
fn network_error_does_not_leak_token() {
    let api = TelegramApi::with_base_url("http://127.0.0.1:9", TOKEN).unwrap();

    let error = api.get_updates(0).unwrap_err();

    assert!(matches!(error, TelegramError::Network(_)));
    assert!(!format!("{error:?}").contains(TOKEN));
    assert!(!error.to_string().contains(TOKEN));
}
