//! # Start Command
//!
//! Handles `/start` and the "I subscribed" recheck button.
//! Subscribed users get the main menu; everyone else gets channel links and a recheck button.

use crate::application::subscription::SubscriptionChecker;
use crate::domain::traits::ChatProvider;
use crate::domain::types::{InlineButton, Keyboard, Sender};
use crate::strings::messages;
use anyhow::Result;

/// Reply keyboard shown to subscribed users.
pub fn main_menu() -> Keyboard {
    Keyboard::reply(&[
        &[messages::APPLY_BUTTON, messages::MY_APPLICATIONS_BUTTON],
        &[messages::CHECK_BUTTON, messages::HELP_BUTTON],
    ])
}

/// Channel links plus the recheck callback.
pub fn subscribe_prompt(channels: &[String; 2]) -> Keyboard {
    let labels = [messages::CHANNEL_BUTTON_1, messages::CHANNEL_BUTTON_2];
    let links: Vec<InlineButton> = channels
        .iter()
        .zip(labels)
        .filter_map(|(channel, label)| {
            messages::channel_link(channel).map(|url| InlineButton::url(label, url))
        })
        .collect();

    let mut rows = Vec::new();
    if !links.is_empty() {
        rows.push(links);
    }
    rows.push(vec![InlineButton::callback(
        messages::RECHECK_BUTTON,
        messages::RECHECK_CALLBACK,
    )]);
    Keyboard::Inline(rows)
}

pub async fn handle_start(
    checker: &SubscriptionChecker,
    chat: &impl ChatProvider,
    sender: &Sender,
) -> Result<()> {
    if checker.is_fully_subscribed(sender.id).await {
        chat.send_with_keyboard(
            &messages::greeting_subscribed(&sender.first_name),
            &main_menu(),
        )
        .await?;
    } else {
        let channels = checker.channels();
        chat.send_with_keyboard(
            &messages::greeting_unsubscribed(&sender.first_name, channels),
            &subscribe_prompt(channels),
        )
        .await?;
    }
    Ok(())
}

pub async fn handle_recheck(
    checker: &SubscriptionChecker,
    chat: &impl ChatProvider,
    user_id: i64,
    callback_id: &str,
) -> Result<()> {
    // A failed ack only leaves a spinner on the button.
    if let Err(e) = chat.answer_callback(callback_id).await {
        tracing::warn!("Failed to answer callback {}: {}", callback_id, e);
    }

    if checker.is_fully_subscribed(user_id).await {
        chat.send_message(messages::RECHECK_SUCCESS).await?;
        chat.send_with_keyboard(messages::CHOOSE_ACTION, &main_menu())
            .await?;
    } else {
        chat.send_message(messages::RECHECK_FAILED).await?;
    }
    Ok(())
}
