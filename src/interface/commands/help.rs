//! # Help Command
//!
//! Handles `/help` and the help button.

use crate::domain::traits::ChatProvider;
use anyhow::Result;

pub async fn handle_help(channels: &[String; 2], chat: &impl ChatProvider) -> Result<()> {
    chat.send_message(&crate::strings::help::main(channels)).await?;
    Ok(())
}
