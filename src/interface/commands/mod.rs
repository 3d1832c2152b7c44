//! # Command Handlers
//!
//! Contains specific handler functions for each supported command and button
//! (`/start`, `/check`, `/help`, `/apply`, `/cancel`, "my applications").
//! These handlers are invoked by the Router.

pub mod applications;
pub mod check;
pub mod form;
pub mod help;
pub mod start;
