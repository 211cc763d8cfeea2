//! Common utilities and shared functionality
//!
//! Identifiers and collaborator traits shared across the Bingo contract.

pub mod types;
pub mod traits;
