//! # Subscription Checker
//!
//! Verifies that a user has joined both configured channels. This is the single access
//! guard for the bot: `/start`, the recheck button and form entry all go through
//! `check_access`.

use std::sync::Arc;

use crate::domain::error::TransportError;
use crate::domain::traits::MembershipProvider;
use crate::domain::types::MemberStatus;

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelStatus {
    pub channel: String,
    pub subscribed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DenyReason {
    NotSubscribed { missing: Vec<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Access {
    Allowed,
    Denied(DenyReason),
}

impl Access {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Access::Allowed)
    }
}

/// Membership policy: a lookup that fails for any reason (network, bot not an admin
/// of the channel, unknown user) counts as "not subscribed".
pub fn fail_closed(
    result: Result<MemberStatus, TransportError>,
    channel: &str,
    user_id: i64,
) -> bool {
    match result {
        Ok(status) => status.is_subscribed(),
        Err(e) => {
            tracing::warn!(
                "Subscription check failed for user {} in {}: {}",
                user_id,
                channel,
                e
            );
            false
        }
    }
}

pub struct SubscriptionChecker {
    channels: [String; 2],
    members: Arc<dyn MembershipProvider>,
}

impl SubscriptionChecker {
    pub fn new(channels: [String; 2], members: Arc<dyn MembershipProvider>) -> Self {
        Self { channels, members }
    }

    pub fn channels(&self) -> &[String; 2] {
        &self.channels
    }

    pub async fn is_subscribed(&self, user_id: i64, channel: &str) -> bool {
        let result = self.members.member_status(channel, user_id).await;
        fail_closed(result, channel, user_id)
    }

    /// Checks each channel independently.
    pub async fn channel_statuses(&self, user_id: i64) -> Vec<ChannelStatus> {
        let mut statuses = Vec::with_capacity(self.channels.len());
        for channel in &self.channels {
            statuses.push(ChannelStatus {
                channel: channel.clone(),
                subscribed: self.is_subscribed(user_id, channel).await,
            });
        }
        statuses
    }

    /// Yes/no form of `check_access`, for callers that don't need the missing channels.
    pub async fn is_fully_subscribed(&self, user_id: i64) -> bool {
        self.check_access(user_id).await.is_allowed()
    }

    pub async fn check_access(&self, user_id: i64) -> Access {
        let missing: Vec<String> = self
            .channel_statuses(user_id)
            .await
            .into_iter()
            .filter(|s| !s.subscribed)
            .map(|s| s.channel)
            .collect();

        if missing.is_empty() {
            Access::Allowed
        } else {
            Access::Denied(DenyReason::NotSubscribed { missing })
        }
    }
}
