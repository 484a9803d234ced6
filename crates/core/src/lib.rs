//! Saweria Relay Core - donation queue and leaderboard domain.
//!
//! This crate contains the relay's business logic: payload normalization,
//! the donation service and the repository traits it is written against.
//! It is database-agnostic; the `storage-sqlite` crate provides the durable
//! repository and this crate ships the in-memory one.

pub mod constants;
pub mod donations;
pub mod errors;

// Re-export common types from the donations module
pub use donations::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
