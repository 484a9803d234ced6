//! SQLite storage implementation for the Saweria relay.
//!
//! This crate provides the durable donation store using Diesel ORM with SQLite.
//! It implements the repository trait defined in `saweria-relay-core` and contains:
//! - Database connection pooling and pragmas
//! - Embedded Diesel migrations
//! - The single writer actor that serializes all mutations
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the workspace where Diesel dependencies exist.
//!
//! ```text
//!        core (domain, traits)
//!                  │
//!                  ▼
//!          storage-sqlite (this crate)
//!                  │
//!                  ▼
//!              SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;

// Repository implementations
pub mod donations;

// Re-export database utilities
pub use db::{create_pool, get_connection, init, run_migrations, DbConnection, DbPool, WriteHandle};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from saweria-relay-core for convenience
pub use saweria_relay_core::errors::{DatabaseError, Error, Result};
