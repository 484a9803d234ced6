//! Donations module - queue and leaderboard models, services, and traits.
//!
//! A donation enters through [`DonationServiceTrait::ingest`], waits in the
//! queue until the polling client confirms it, and is eventually removed by
//! the cleanup sweep. Every ingest also credits the donor's leaderboard entry.
//!
//! ```text
//! webhook ──► FieldAliases ──► DonationService ──► DonationRepositoryTrait
//!                                   ▲                  ├─ InMemoryDonationRepository
//!                    poll / confirm ┘                  └─ (storage-sqlite)
//! ```

mod donations_model;
mod donations_service;
mod donations_traits;
mod field_aliases;
mod memory_repository;


pub use donations_model::{
    format_timestamp, ClearSummary, Donation, DonationStats, IngestReceipt, PollResult,
    PurgeCutoffs, QueueSnapshot, RetentionPolicy, TopSpender,
};
pub use donations_service::DonationService;
pub use donations_traits::{DonationRepositoryTrait, DonationServiceTrait};
pub use field_aliases::{parse_amount, DonationFields, FieldAliases, SAWERIA_FIELD_ALIASES};
pub use memory_repository::InMemoryDonationRepository;
