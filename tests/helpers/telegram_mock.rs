//! Mock Telegram API server for testing
//!
//! Simulates the Bot API endpoints the dispatcher talks to, so broadcast
//! behavior (dedup, per-chat isolation) can be exercised without a live
//! bot. Built on wiremock.

use serde_json::json;
use teloxide::Bot;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_BOT_TOKEN: &str = "12345:test_token";

pub struct TelegramMockServer {
    pub server: MockServer,
}

impl TelegramMockServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// A bot wired to this mock server instead of api.telegram.org.
    pub fn bot(&self) -> Bot {
        let api_url = url::Url::parse(&self.server.uri()).expect("mock server uri");
        Bot::new(TEST_BOT_TOKEN).set_api_url(api_url)
    }

    fn endpoint(name: &str) -> String {
        format!("/bot{}/{}", TEST_BOT_TOKEN, name)
    }

    fn message_response(message_id: i32) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": {
                "message_id": message_id,
                "from": {
                    "id": 12345,
                    "is_bot": true,
                    "first_name": "DeskGenieTestBot",
                    "username": "deskgenie_test_bot"
                },
                "chat": {
                    "id": -1001234567890_i64,
                    "title": "Support",
                    "type": "supergroup"
                },
                "date": 1640995200,
                "text": "stub"
            }
        }))
    }

    /// Every sendMessage succeeds.
    pub async fn mock_send_message_ok(&self) {
        Mock::given(method("POST"))
            .and(path(Self::endpoint("sendMessage")))
            .respond_with(Self::message_response(123))
            .mount(&self.server)
            .await;
    }

    /// sendMessage fails for one chat only. Mount before the catch-all
    /// success mock; wiremock picks the first matching mock.
    pub async fn mock_send_message_fails_for_chat(&self, chat_id: i64) {
        Mock::given(method("POST"))
            .and(path(Self::endpoint("sendMessage")))
            .and(body_string_contains(chat_id.to_string()))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: chat not found"
            })))
            .mount(&self.server)
            .await;
    }

    /// How many times an endpoint was hit.
    pub async fn calls_to(&self, endpoint: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|req| req.url.path().ends_with(endpoint))
            .count()
    }
}
