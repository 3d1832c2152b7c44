//! Test doubles for the chat transport.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::domain::error::TransportError;
use crate::domain::traits::{ChatProvider, MembershipProvider};
use crate::domain::types::{Keyboard, MemberStatus};

/// Membership table. Unknown pairs answer like Telegram does for strangers.
/// Clones share the table, so a test can change membership behind a running checker.
#[derive(Default, Clone)]
pub struct FakeMembers {
    statuses: Arc<Mutex<HashMap<(i64, String), Option<MemberStatus>>>>,
}

impl FakeMembers {
    pub fn with(self, user_id: i64, channel: &str, status: MemberStatus) -> Self {
        self.set(user_id, channel, Some(status));
        self
    }

    /// Lookups for this pair fail with a network error.
    pub fn failing(self, user_id: i64, channel: &str) -> Self {
        self.set(user_id, channel, None);
        self
    }

    pub fn subscribed(user_id: i64, channels: &[&str]) -> Self {
        channels.iter().fold(Self::default(), |acc, channel| {
            acc.with(user_id, channel, MemberStatus::Member)
        })
    }

    /// The user leaves `channel`.
    pub fn leave(&self, user_id: i64, channel: &str) {
        self.set(user_id, channel, Some(MemberStatus::Left));
    }

    fn set(&self, user_id: i64, channel: &str, status: Option<MemberStatus>) {
        self.statuses
            .lock()
            .unwrap()
            .insert((user_id, channel.to_string()), status);
    }
}

#[async_trait]
impl MembershipProvider for FakeMembers {
    async fn member_status(
        &self,
        channel: &str,
        user_id: i64,
    ) -> Result<MemberStatus, TransportError> {
        let status = self
            .statuses
            .lock()
            .unwrap()
            .get(&(user_id, channel.to_string()))
            .copied();
        match status {
            Some(Some(status)) => Ok(status),
            Some(None) => Err(TransportError::Http("connection reset".to_string())),
            None => Err(TransportError::Api {
                code: 400,
                description: "Bad Request: user not found".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

/// Records everything the bot sends.
#[derive(Clone, Default)]
pub struct RecordingChat {
    sent: Arc<Mutex<Vec<SentMessage>>>,
    answered: Arc<Mutex<Vec<String>>>,
}

impl RecordingChat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|m| m.text).collect()
    }

    pub fn last_text(&self) -> String {
        self.texts().pop().unwrap_or_default()
    }

    pub fn answered(&self) -> Vec<String> {
        self.answered.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl ChatProvider for RecordingChat {
    async fn send_message(&self, content: &str) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push(SentMessage {
            text: content.to_string(),
            keyboard: None,
        });
        Ok(())
    }

    async fn send_with_keyboard(
        &self,
        content: &str,
        keyboard: &Keyboard,
    ) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push(SentMessage {
            text: content.to_string(),
            keyboard: Some(keyboard.clone()),
        });
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), TransportError> {
        self.answered.lock().unwrap().push(callback_id.to_string());
        Ok(())
    }
}
