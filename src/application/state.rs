//! # Bot State
//!
//! In-memory conversation state: one `FormSession` per user while they fill in the
//! intake form. Nothing here is persisted; a restart drops all open sessions.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStep {
    Name,
    City,
    Phone,
    Confirm,
}

/// Progress of one user through the form.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSession {
    pub step: FormStep,
    pub name: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
}

impl Default for FormSession {
    fn default() -> Self {
        Self {
            step: FormStep::Name,
            name: None,
            city: None,
            phone: None,
        }
    }
}

/// Open form sessions keyed by user id.
#[derive(Debug, Default)]
pub struct BotState {
    pub sessions: HashMap<i64, FormSession>,
}

impl BotState {
    /// Starts a fresh session, dropping any previous one for this user.
    pub fn begin_session(&mut self, user_id: i64) -> &mut FormSession {
        self.sessions
            .entry(user_id)
            .insert_entry(FormSession::default())
            .into_mut()
    }

    pub fn session_mut(&mut self, user_id: i64) -> Option<&mut FormSession> {
        self.sessions.get_mut(&user_id)
    }

    pub fn has_session(&self, user_id: i64) -> bool {
        self.sessions.contains_key(&user_id)
    }

    /// Removes the session. Returns whether one existed.
    pub fn end_session(&mut self, user_id: i64) -> bool {
        self.sessions.remove(&user_id).is_some()
    }
}
