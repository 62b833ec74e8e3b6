//! Telegram messenger: sendMessage / sendPhoto via the Bot API.

use crate::delivery::Payload;
use crate::messengers::Messenger;
use async_trait::async_trait;
use std::time::Duration;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Delivers to Telegram chats; the umo session id is the chat id.
pub struct TelegramMessenger {
    id: String,
    token: String,
    api_base: String,
    client: reqwest::Client,
}

impl TelegramMessenger {
    pub fn new(token: String) -> Self {
        Self::with_api_base(token, telegram_api_base())
    }

    /// Use a custom Bot API endpoint (self-hosted Bot API server, tests).
    pub fn with_api_base(token: String, api_base: impl Into<String>) -> Self {
        Self {
            id: "telegram".to_string(),
            token,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    /// Send a text message to a chat via sendMessage API.
    pub async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), String> {
        let body = serde_json::json!({ "chat_id": chat_id, "text": text });
        let res = self
            .client
            .post(self.method_url("sendMessage"))
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(format!("sendMessage failed: {} {}", status, body));
        }
        Ok(())
    }

    /// Upload an image to a chat via sendPhoto (multipart).
    pub async fn send_photo(
        &self,
        chat_id: &str,
        bytes: Vec<u8>,
        file_name: String,
        mime: &str,
    ) -> Result<(), String> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime)
            .map_err(|e| e.to_string())?;
        let form = reqwest::multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .part("photo", part);
        let res = self
            .client
            .post(self.method_url("sendPhoto"))
            .timeout(REQUEST_TIMEOUT)
            .multipart(form)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(format!("sendPhoto failed: {} {}", status, body));
        }
        Ok(())
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    fn id(&self) -> &str {
        &self.id
    }

    async fn send_message(&self, target: &str, payload: &Payload) -> Result<(), String> {
        match payload {
            Payload::Text(text) => self.send_text(target, text).await,
            Payload::Image { bytes, format } => {
                self.send_photo(
                    target,
                    bytes.clone(),
                    format!("image.{}", format.extension()),
                    format.mime(),
                )
                .await
            }
        }
    }
}

/// Resolve Telegram bot API base URL (TELEGRAM_API_BASE env or the public endpoint).
pub fn telegram_api_base() -> String {
    std::env::var("TELEGRAM_API_BASE").unwrap_or_else(|_| TELEGRAM_API_BASE.to_string())
}
