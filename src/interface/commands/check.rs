//! # Check Command
//!
//! Handles `/check` and the "check subscriptions" button: one line per channel plus a summary.

use crate::application::subscription::SubscriptionChecker;
use crate::domain::traits::ChatProvider;
use anyhow::Result;

pub async fn handle_check(
    checker: &SubscriptionChecker,
    chat: &impl ChatProvider,
    user_id: i64,
) -> Result<()> {
    let statuses = checker.channel_statuses(user_id).await;
    chat.send_message(&crate::strings::messages::subscription_report(&statuses))
        .await?;
    Ok(())
}
