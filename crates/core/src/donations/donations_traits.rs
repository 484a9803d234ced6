use async_trait::async_trait;
use serde_json::Value;

use super::donations_model::{
    ClearSummary, Donation, DonationStats, IngestReceipt, PollResult, PurgeCutoffs,
    QueueSnapshot, TopSpender,
};
use crate::errors::Result;

/// Storage for the donation queue and the leaderboard.
///
/// Mutations are async so the SQLite implementation can route them through
/// its writer actor; reads are synchronous.
#[async_trait]
pub trait DonationRepositoryTrait: Send + Sync {
    /// Appends `donation` to the queue and adds its amount to the donor's
    /// leaderboard entry. Either both changes land or neither does.
    async fn record(&self, donation: Donation) -> Result<()>;

    /// Flags a donation as delivered. Returns `false` when no donation has
    /// that id.
    async fn mark_delivered(&self, donation_id: &str) -> Result<bool>;

    /// Removes every donation the cutoffs consider expired. Returns the
    /// number removed. Leaderboard totals are untouched.
    async fn purge(&self, cutoffs: PurgeCutoffs) -> Result<usize>;

    /// Empties the queue and the leaderboard.
    async fn clear(&self) -> Result<ClearSummary>;

    fn oldest_undelivered(&self) -> Result<Option<Donation>>;

    fn count_undelivered(&self) -> Result<usize>;

    /// Every stored donation, oldest first.
    fn list_donations(&self) -> Result<Vec<Donation>>;

    /// Leaderboard ranked by total descending, then username ascending.
    fn top_spenders(&self, limit: Option<usize>) -> Result<Vec<TopSpender>>;

    /// Short name of the backend, reported by the status endpoint.
    fn backend_name(&self) -> &'static str;
}

/// Operations exposed to the HTTP layer.
#[async_trait]
pub trait DonationServiceTrait: Send + Sync {
    async fn ingest(&self, payload: &Value) -> Result<IngestReceipt>;
    async fn poll(&self, confirm_id: Option<&str>) -> Result<PollResult>;
    async fn sweep(&self) -> Result<usize>;
    async fn clear(&self) -> Result<ClearSummary>;
    fn snapshot(&self) -> Result<QueueSnapshot>;
    fn stats(&self) -> Result<DonationStats>;
    fn queue_size(&self) -> Result<usize>;
    fn backend_name(&self) -> &'static str;
}
