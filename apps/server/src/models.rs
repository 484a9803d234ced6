//! Response envelopes for the HTTP API.

use saweria_relay_core::{ClearSummary, Donation, DonationStats, QueueSnapshot, TopSpender};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct IngestResponse {
    pub success: bool,
    pub donation_id: String,
    pub queue_size: usize,
}

#[derive(Deserialize, Debug, Default)]
pub struct CheckQuery {
    pub confirm: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
pub struct StatusResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub storage: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    pub queue_size: usize,
    pub total_donations: usize,
    pub uptime_seconds: i64,
    pub timestamp: String,
    pub endpoints: Vec<&'static str>,
}

#[derive(Serialize, Debug, Clone)]
pub struct DebugResponse {
    pub donations: Vec<Donation>,
    pub top_spenders: Vec<TopSpender>,
    pub queue_size: usize,
    pub total_donations: usize,
}

impl From<QueueSnapshot> for DebugResponse {
    fn from(snapshot: QueueSnapshot) -> Self {
        let queue_size = snapshot.donations.iter().filter(|d| !d.delivered).count();
        Self {
            total_donations: snapshot.donations.len(),
            queue_size,
            donations: snapshot.donations,
            top_spenders: snapshot.top_spenders,
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: DonationStats,
    pub timestamp: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct ClearResponse {
    pub success: bool,
    pub message: String,
    pub donations_removed: usize,
    pub top_spenders_removed: usize,
}

impl From<ClearSummary> for ClearResponse {
    fn from(summary: ClearSummary) -> Self {
        Self {
            success: true,
            message: "All donations and leaderboard entries cleared".to_string(),
            donations_removed: summary.donations_removed,
            top_spenders_removed: summary.top_spenders_removed,
        }
    }
}
