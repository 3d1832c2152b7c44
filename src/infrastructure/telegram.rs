//! # Telegram Service Adapter
//!
//! Implements `ChatProvider` and `MembershipProvider` on top of the Telegram Bot HTTP API.
//! Raw updates from `getUpdates` are converted into transport-neutral `Incoming` values
//! so the router never sees Telegram types.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::error::TransportError;
use crate::domain::traits::{ChatProvider, MembershipProvider};
use crate::domain::types::{
    ButtonAction, Incoming, IncomingKind, Keyboard, MemberStatus, Sender,
};

/// Bot API response envelope.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub from: Option<TgUser>,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgUser {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: TgUser,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatMember {
    status: MemberStatus,
}

#[derive(Debug, Serialize)]
struct InlineKeyboardButton<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    callback_data: Option<&'a str>,
}

impl From<TgUser> for Sender {
    fn from(user: TgUser) -> Self {
        Sender {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

impl Update {
    /// Converts the update into an `Incoming`, or `None` for kinds the bot ignores
    /// (edits, channel posts, stickers, anonymous messages).
    pub fn into_incoming(self) -> Option<Incoming> {
        if let Some(query) = self.callback_query {
            let chat_id = query
                .message
                .as_ref()
                .map(|m| m.chat.id)
                .unwrap_or(query.from.id);
            return Some(Incoming {
                sender: query.from.into(),
                chat_id,
                kind: IncomingKind::Callback {
                    id: query.id,
                    data: query.data.unwrap_or_default(),
                },
            });
        }

        let message = self.message?;
        let from = message.from?;
        let text = message.text?;
        Some(Incoming {
            sender: from.into(),
            chat_id: message.chat.id,
            kind: IncomingKind::Text(text),
        })
    }
}

/// Serialises a domain keyboard into a Bot API `reply_markup` object.
pub fn reply_markup(keyboard: &Keyboard) -> Value {
    match keyboard {
        Keyboard::Reply(rows) => {
            let rows: Vec<Vec<Value>> = rows
                .iter()
                .map(|row| row.iter().map(|label| json!({ "text": label })).collect())
                .collect();
            json!({ "keyboard": rows, "resize_keyboard": true })
        }
        Keyboard::Inline(rows) => {
            let rows: Vec<Vec<InlineKeyboardButton<'_>>> = rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|button| match &button.action {
                            ButtonAction::Url(url) => InlineKeyboardButton {
                                text: &button.text,
                                url: Some(url),
                                callback_data: None,
                            },
                            ButtonAction::Callback(data) => InlineKeyboardButton {
                                text: &button.text,
                                url: None,
                                callback_data: Some(data),
                            },
                        })
                        .collect()
                })
                .collect();
            json!({ "inline_keyboard": rows })
        }
    }
}

/// Thin client for the Bot API methods the bot needs.
pub struct TelegramApi {
    http: Client,
    base_url: String,
    poll_timeout: u64,
}

impl TelegramApi {
    pub fn new(api_url: &str, token: &str, poll_timeout: u64) -> Result<Self, TransportError> {
        // Must outlive the long-poll window or every idle poll becomes an error.
        let http = Client::builder()
            .timeout(Duration::from_secs(poll_timeout + 15))
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;
        Ok(Self {
            http,
            base_url: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
            poll_timeout,
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: Value) -> Result<T, TransportError> {
        let url = format!("{}/{}", self.base_url, method);
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| TransportError::Http(e.without_url().to_string()))?;

        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.without_url().to_string()))?;

        if !envelope.ok {
            return Err(TransportError::Api {
                code: envelope.error_code.unwrap_or_default(),
                description: envelope.description.unwrap_or_default(),
            });
        }
        envelope
            .result
            .ok_or_else(|| TransportError::Decode(format!("{method}: missing result")))
    }

    /// Long-polls for updates after `offset`.
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, TransportError> {
        self.call(
            "getUpdates",
            json!({
                "offset": offset,
                "timeout": self.poll_timeout,
                "allowed_updates": ["message", "callback_query"],
            }),
        )
        .await
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError> {
        let mut body = json!({ "chat_id": chat_id, "text": text });
        if let Some(kb) = keyboard {
            body["reply_markup"] = reply_markup(kb);
        }
        self.call::<Value>("sendMessage", body).await.map(|_| ())
    }

    pub async fn answer_callback_query(&self, callback_id: &str) -> Result<(), TransportError> {
        self.call::<bool>("answerCallbackQuery", json!({ "callback_query_id": callback_id }))
            .await
            .map(|_| ())
    }

    pub async fn get_chat_member(
        &self,
        channel: &str,
        user_id: i64,
    ) -> Result<MemberStatus, TransportError> {
        let member: ChatMember = self
            .call("getChatMember", json!({ "chat_id": channel, "user_id": user_id }))
            .await?;
        Ok(member.status)
    }
}

#[async_trait]
impl MembershipProvider for TelegramApi {
    async fn member_status(
        &self,
        channel: &str,
        user_id: i64,
    ) -> Result<MemberStatus, TransportError> {
        self.get_chat_member(channel, user_id).await
    }
}

/// One conversation, addressed by chat id.
#[derive(Clone)]
pub struct TelegramChat {
    api: Arc<TelegramApi>,
    chat_id: i64,
}

impl TelegramChat {
    pub fn new(api: Arc<TelegramApi>, chat_id: i64) -> Self {
        Self { api, chat_id }
    }
}

#[async_trait]
impl ChatProvider for TelegramChat {
    async fn send_message(&self, content: &str) -> Result<(), TransportError> {
        tracing::debug!("Bot sending message to {}: {}", self.chat_id, content);
        self.api.send_message(self.chat_id, content, None).await
    }

    async fn send_with_keyboard(
        &self,
        content: &str,
        keyboard: &Keyboard,
    ) -> Result<(), TransportError> {
        tracing::debug!("Bot sending message with keyboard to {}: {}", self.chat_id, content);
        self.api.send_message(self.chat_id, content, Some(keyboard)).await
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), TransportError> {
        self.api.answer_callback_query(callback_id).await
    }
}
