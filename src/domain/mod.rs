//! Core domain types and logic.

pub mod quote;
pub mod simulation;
pub mod period;
pub mod config_validation;
pub mod error;
