//! # Infrastructure Layer
//!
//! Handles interactions with external systems and services.
//! Implements the traits defined in the Domain layer (`ChatProvider`, `MembershipProvider`)
//! and owns the SQLite record store.

pub mod store;
pub mod telegram;
