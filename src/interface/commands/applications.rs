//! # My Applications
//!
//! Lists the sender's submitted applications, newest first.

use crate::domain::traits::ChatProvider;
use crate::infrastructure::store::RecordStore;
use crate::strings::messages;
use anyhow::Result;

pub async fn handle_list(store: &RecordStore, chat: &impl ChatProvider, user_id: i64) -> Result<()> {
    let apps = store.list_applications_for_user(user_id)?;
    if apps.is_empty() {
        chat.send_message(messages::NO_APPLICATIONS).await?;
        return Ok(());
    }
    for page in messages::applications_pages(&apps) {
        chat.send_message(&page).await?;
    }
    Ok(())
}
