//! # Form Command Handler
//!
//! Drives the intake form: `/apply` (or the apply button) opens a session, each following
//! message advances it, and confirmation writes the application to the store.
//! The step logic itself lives in `application::flow`.

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::application::flow::FlowOutcome;
use crate::application::state::{BotState, FormStep};
use crate::application::subscription::{Access, DenyReason, SubscriptionChecker};
use crate::domain::traits::ChatProvider;
use crate::domain::types::Keyboard;
use crate::infrastructure::store::RecordStore;
use crate::strings::messages;
use anyhow::Result;

fn confirm_keyboard() -> Keyboard {
    Keyboard::reply(&[&[messages::CONFIRM_BUTTON, messages::CANCEL_BUTTON]])
}

/// Opens a fresh session if the user passes the subscription guard.
/// A refused entry also drops any session the user already had open.
pub async fn handle_apply(
    state: &Arc<Mutex<BotState>>,
    checker: &SubscriptionChecker,
    chat: &impl ChatProvider,
    user_id: i64,
) -> Result<()> {
    if let Access::Denied(DenyReason::NotSubscribed { missing }) =
        checker.check_access(user_id).await
    {
        tracing::info!(
            "User {} refused form entry, missing: {}",
            user_id,
            missing.join(", ")
        );
        state.lock().await.end_session(user_id);
        chat.send_message(messages::FORM_DENIED).await?;
        return Ok(());
    }

    state.lock().await.begin_session(user_id);
    tracing::info!("User {} started an application", user_id);
    chat.send_message(messages::FORM_START).await?;
    Ok(())
}

/// Ends the user's session. Returns `false` (and says nothing) when there was none.
pub async fn handle_cancel(
    state: &Arc<Mutex<BotState>>,
    chat: &impl ChatProvider,
    user_id: i64,
) -> Result<bool> {
    if !state.lock().await.end_session(user_id) {
        return Ok(false);
    }
    tracing::info!("User {} cancelled their application", user_id);
    chat.send_message(messages::FORM_CANCELLED).await?;
    Ok(true)
}

/// Feeds one message into the user's open session.
pub async fn handle_step(
    state: &Arc<Mutex<BotState>>,
    store: &RecordStore,
    chat: &impl ChatProvider,
    user_id: i64,
    input: &str,
) -> Result<()> {
    let outcome = {
        let mut guard = state.lock().await;
        let Some(session) = guard.session_mut(user_id) else {
            return Ok(());
        };
        session.advance(input)
    }; // guard drops

    match outcome {
        FlowOutcome::Rejected(step) => {
            let prompt = match step {
                FormStep::Name => messages::NAME_INVALID,
                FormStep::City => messages::CITY_INVALID,
                FormStep::Phone => messages::PHONE_INVALID,
                FormStep::Confirm => messages::CONFIRM_REPROMPT,
            };
            chat.send_message(prompt).await?;
        }
        FlowOutcome::Advanced(step) => {
            let prompt = match step {
                FormStep::City => messages::ASK_CITY,
                FormStep::Phone => messages::ASK_PHONE,
                FormStep::Name | FormStep::Confirm => messages::FORM_START,
            };
            chat.send_message(prompt).await?;
        }
        FlowOutcome::AwaitingConfirmation(form) => {
            chat.send_with_keyboard(
                &messages::confirm_summary(&form.name, &form.city, &form.phone),
                &confirm_keyboard(),
            )
            .await?;
        }
        FlowOutcome::Submit(form) => {
            match store.insert_application(user_id, &form.name, &form.city, &form.phone) {
                Ok(id) => {
                    state.lock().await.end_session(user_id);
                    tracing::info!("Application #{} created for user {}", id, user_id);
                    chat.send_message(&messages::application_created(
                        id, &form.name, &form.city, &form.phone,
                    ))
                    .await?;
                }
                Err(e) => {
                    // Session stays at Confirm so pressing the button again retries.
                    tracing::error!("Failed to save application for user {}: {:#}", user_id, e);
                    chat.send_with_keyboard(messages::SAVE_FAILED, &confirm_keyboard())
                        .await?;
                }
            }
        }
        FlowOutcome::Cancelled => {
            state.lock().await.end_session(user_id);
            tracing::info!("User {} cancelled their application", user_id);
            chat.send_message(messages::FORM_CANCELLED).await?;
        }
    }
    Ok(())
}
