//! # Domain Traits
//!
//! Abstract interfaces for the chat platform.
//! Allows the router and the form flow to run against Telegram or a test double.

use async_trait::async_trait;

use crate::domain::error::TransportError;
use crate::domain::types::{Keyboard, MemberStatus};

/// Abstract interface for a single chat (one conversation with one user).
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send a plain text message
    async fn send_message(&self, content: &str) -> Result<(), TransportError>;

    /// Send a message with a reply or inline keyboard attached
    async fn send_with_keyboard(
        &self,
        content: &str,
        keyboard: &Keyboard,
    ) -> Result<(), TransportError>;

    /// Acknowledge an inline button press
    async fn answer_callback(&self, callback_id: &str) -> Result<(), TransportError>;
}

/// Abstract interface for channel membership lookups.
#[async_trait]
pub trait MembershipProvider: Send + Sync {
    async fn member_status(
        &self,
        channel: &str,
        user_id: i64,
    ) -> Result<MemberStatus, TransportError>;
}
