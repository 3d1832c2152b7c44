//! # Form Flow
//!
//! The intake form as a pure state machine: `Name -> City -> Phone -> Confirm`.
//! `FormSession::advance` consumes one user message and reports what happened;
//! sending replies and writing to the store is left to the command handlers.

use crate::application::state::{FormSession, FormStep};
use crate::application::validation::{is_valid_city, is_valid_name, is_valid_phone};
use crate::strings::messages::{CANCEL_BUTTON, CONFIRM_BUTTON};

/// The three collected fields, all validated.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedForm {
    pub name: String,
    pub city: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FlowOutcome {
    /// Input failed validation (or was not a recognised answer); the step is unchanged.
    Rejected(FormStep),
    /// Input accepted; the session now waits at the given step.
    Advanced(FormStep),
    /// Phone accepted; the session waits for confirmation of these values.
    AwaitingConfirmation(CompletedForm),
    /// The user confirmed. The caller persists the form and ends the session.
    Submit(CompletedForm),
    /// The user cancelled. The caller ends the session.
    Cancelled,
}

impl FormSession {
    pub fn completed(&self) -> Option<CompletedForm> {
        Some(CompletedForm {
            name: self.name.clone()?,
            city: self.city.clone()?,
            phone: self.phone.clone()?,
        })
    }

    /// Feeds one message into the form.
    pub fn advance(&mut self, input: &str) -> FlowOutcome {
        let input = input.trim();

        if input == CANCEL_BUTTON {
            *self = FormSession::default();
            return FlowOutcome::Cancelled;
        }

        match self.step {
            FormStep::Name => {
                if !is_valid_name(input) {
                    return FlowOutcome::Rejected(FormStep::Name);
                }
                self.name = Some(input.to_string());
                self.step = FormStep::City;
                FlowOutcome::Advanced(FormStep::City)
            }
            FormStep::City => {
                if !is_valid_city(input) {
                    return FlowOutcome::Rejected(FormStep::City);
                }
                self.city = Some(input.to_string());
                self.step = FormStep::Phone;
                FlowOutcome::Advanced(FormStep::Phone)
            }
            FormStep::Phone => {
                if !is_valid_phone(input) {
                    return FlowOutcome::Rejected(FormStep::Phone);
                }
                self.phone = Some(input.to_string());
                match self.completed() {
                    Some(form) => {
                        self.step = FormStep::Confirm;
                        FlowOutcome::AwaitingConfirmation(form)
                    }
                    None => self.restart(),
                }
            }
            FormStep::Confirm => {
                if input != CONFIRM_BUTTON {
                    return FlowOutcome::Rejected(FormStep::Confirm);
                }
                match self.completed() {
                    Some(form) => FlowOutcome::Submit(form),
                    None => self.restart(),
                }
            }
        }
    }

    /// Fields went missing somehow; start over rather than submit a partial form.
    fn restart(&mut self) -> FlowOutcome {
        tracing::warn!("Form session reached {:?} with missing fields, restarting", self.step);
        *self = FormSession::default();
        FlowOutcome::Advanced(FormStep::Name)
    }
}
