//! # Domain Types
//!
//! Common data structures and enums used across the application logic.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A registered bot user. `join_date` is set once and survives re-registration.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
    pub join_date: DateTime<Utc>,
}

/// A submitted intake form.
#[derive(Debug, Clone, PartialEq)]
pub struct Application {
    pub id: i64,
    pub user_id: i64,
    pub full_name: String,
    pub city: String,
    pub phone: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// The person behind an incoming update.
#[derive(Debug, Clone, PartialEq)]
pub struct Sender {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IncomingKind {
    /// Plain text or a slash command.
    Text(String),
    /// Inline keyboard press.
    Callback { id: String, data: String },
}

/// Transport-neutral view of one update.
#[derive(Debug, Clone, PartialEq)]
pub struct Incoming {
    pub sender: Sender,
    pub chat_id: i64,
    pub kind: IncomingKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ButtonAction {
    Url(String),
    Callback(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct InlineButton {
    pub text: String,
    pub action: ButtonAction,
}

impl InlineButton {
    pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::Url(url.into()),
        }
    }

    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::Callback(data.into()),
        }
    }
}

/// Keyboard attached to an outgoing message.
#[derive(Debug, Clone, PartialEq)]
pub enum Keyboard {
    /// Persistent buttons under the input field. Pressing one sends its label as text.
    Reply(Vec<Vec<String>>),
    /// Buttons attached to the message itself.
    Inline(Vec<Vec<InlineButton>>),
}

impl Keyboard {
    pub fn reply(rows: &[&[&str]]) -> Self {
        Keyboard::Reply(
            rows.iter()
                .map(|row| row.iter().map(|label| label.to_string()).collect())
                .collect(),
        )
    }
}

/// Membership of a user in a channel as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Creator,
    Administrator,
    Member,
    Restricted,
    Left,
    Kicked,
}

impl MemberStatus {
    /// Members, administrators and owners count as subscribed.
    pub fn is_subscribed(self) -> bool {
        matches!(
            self,
            MemberStatus::Creator | MemberStatus::Administrator | MemberStatus::Member
        )
    }
}
