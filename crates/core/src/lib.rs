//! Domain logic for the booking backend.
//!
//! This crate has zero internal dependencies so the rule engine can be used
//! by the API layer, the reminder sweep, and any future CLI tooling alike.

pub mod error;
pub mod roles;
pub mod scheduling;
pub mod types;
