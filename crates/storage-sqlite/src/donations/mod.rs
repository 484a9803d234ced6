//! SQLite storage implementation for the donation queue and leaderboard.

mod model;
mod repository;

pub use model::{DonationDB, TopSpenderDB};
pub use repository::DonationRepository;
