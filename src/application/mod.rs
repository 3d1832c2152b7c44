//! # Application Layer
//!
//! Contains the core business logic and orchestration of the bot:
//! the subscription guard, the intake form state machine and the command router.

pub mod flow;
pub mod router;
pub mod state;
pub mod subscription;
pub mod validation;

#[cfg(test)]
pub mod testing;
