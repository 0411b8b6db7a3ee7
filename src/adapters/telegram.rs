//! Telegram Bot API adapter.
//!
//! Covers both directions of the conversation: long-polled updates in,
//! and text messages, inline menus, and document uploads out.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use super::Messenger;

const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Telegram Bot API client
#[derive(Clone)]
pub struct TelegramClient {
    /// Bot token
    bot_token: String,
    /// API host (overridable for tests)
    api_base: String,
    /// HTTP client
    client: reqwest::Client,
}

/// Response envelope from the Telegram API
#[derive(Debug, Deserialize)]
struct TelegramResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

/// Message result from sendMessage/sendDocument
#[derive(Debug, Deserialize)]
struct MessageResult {
    #[allow(dead_code)]
    message_id: i64,
}

/// One update from getUpdates long polling.
#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// An inline-keyboard button press.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    #[serde(default)]
    pub data: Option<String>,
    /// The message the keyboard was attached to; identifies the chat.
    #[serde(default)]
    pub message: Option<Message>,
}

impl TelegramClient {
    /// Create a new Telegram client
    pub fn new(bot_token: String) -> Self {
        Self {
            bot_token,
            api_base: DEFAULT_API_BASE.to_string(),
            // No request timeout here: getUpdates long-polls.
            client: reqwest::Client::new(),
        }
    }

    /// Point the client at a different API host (tests).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Build API URL
    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.bot_token, method)
    }

    fn check<T>(result: TelegramResponse<T>) -> Result<Option<T>> {
        if !result.ok {
            anyhow::bail!(
                "Telegram API error: {}",
                result.description.unwrap_or_default()
            );
        }
        Ok(result.result)
    }

    /// Long-poll for updates newer than `offset`.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
        let url = self.api_url("getUpdates");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", timeout_secs.to_string()),
            ])
            .send()
            .await
            .context("Failed to poll Telegram updates")?;

        let result: TelegramResponse<Vec<Update>> = response
            .json()
            .await
            .context("Failed to parse Telegram response")?;

        Ok(Self::check(result)?.unwrap_or_default())
    }

    /// Send a text message
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let url = self.api_url("sendMessage");

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "chat_id": chat_id,
                "text": text,
            }))
            .send()
            .await
            .context("Failed to send Telegram message")?;

        let result: TelegramResponse<MessageResult> = response
            .json()
            .await
            .context("Failed to parse Telegram response")?;

        Self::check(result)?;
        Ok(())
    }

    /// Send a text message with an inline keyboard, two buttons per row.
    pub async fn send_menu(
        &self,
        chat_id: i64,
        text: &str,
        options: &[(String, String)],
    ) -> Result<()> {
        let url = self.api_url("sendMessage");

        let keyboard: Vec<Vec<serde_json::Value>> = options
            .chunks(2)
            .map(|row| {
                row.iter()
                    .map(|(label, data)| {
                        serde_json::json!({ "text": label, "callback_data": data })
                    })
                    .collect()
            })
            .collect();

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "chat_id": chat_id,
                "text": text,
                "reply_markup": { "inline_keyboard": keyboard },
            }))
            .send()
            .await
            .context("Failed to send Telegram menu")?;

        let result: TelegramResponse<MessageResult> = response
            .json()
            .await
            .context("Failed to parse Telegram response")?;

        Self::check(result)?;
        Ok(())
    }

    /// Send a document file with a caption
    pub async fn send_document(&self, chat_id: i64, path: &Path, caption: &str) -> Result<()> {
        let url = self.api_url("sendDocument");

        let file_name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        let file_bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read document: {}", path.display()))?;

        let file_part = Part::bytes(file_bytes)
            .file_name(file_name)
            .mime_str("text/plain")?;

        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .part("document", file_part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .context("Failed to send Telegram document")?;

        let result: TelegramResponse<MessageResult> = response
            .json()
            .await
            .context("Failed to parse Telegram response")?;

        Self::check(result)?;
        Ok(())
    }

    /// Acknowledge a callback query so the client stops its spinner.
    pub async fn answer_callback_query(&self, query_id: &str) -> Result<()> {
        let url = self.api_url("answerCallbackQuery");

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "callback_query_id": query_id }))
            .send()
            .await
            .context("Failed to answer callback query")?;

        let result: TelegramResponse<bool> = response
            .json()
            .await
            .context("Failed to parse Telegram response")?;

        Self::check(result)?;
        Ok(())
    }
}

/// A [`TelegramClient`] bound to one chat, usable as a [`Messenger`].
#[derive(Clone)]
pub struct TelegramChat {
    client: TelegramClient,
    chat_id: i64,
}

impl TelegramChat {
    pub fn new(client: TelegramClient, chat_id: i64) -> Self {
        Self { client, chat_id }
    }
}

#[async_trait]
impl Messenger for TelegramChat {
    async fn send_text(&self, text: &str) -> Result<()> {
        self.client.send_message(self.chat_id, text).await
    }

    async fn send_menu(&self, text: &str, options: &[(String, String)]) -> Result<()> {
        self.client.send_menu(self.chat_id, text, options).await
    }

    async fn send_document(&self, path: &Path, caption: &str) -> Result<()> {
        self.client.send_document(self.chat_id, path, caption).await
    }
}
