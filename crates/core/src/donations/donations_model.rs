//! Donation domain models.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::field_aliases::DonationFields;
use crate::constants::{DEFAULT_DELIVERED_RETENTION_SECS, DEFAULT_MAX_AGE_SECS};

/// One queued webhook event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Donation {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub amount: i64,
    pub message: String,
    /// RFC 3339 UTC, millisecond precision.
    pub timestamp: String,
    /// Epoch milliseconds, same instant as `timestamp`.
    pub received_at: i64,
    pub delivered: bool,
}

impl Donation {
    /// Builds an undelivered donation received at `received`.
    ///
    /// Ids are UUIDv7 so they are unique and sort by creation time.
    pub fn new(fields: DonationFields, received: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            display_name: fields.username.clone(),
            username: fields.username,
            amount: fields.amount,
            message: fields.message,
            timestamp: format_timestamp(received),
            received_at: received.timestamp_millis(),
            delivered: false,
        }
    }
}

/// Cumulative total for one donor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TopSpender {
    pub username: String,
    pub display_name: String,
    pub total_amount: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestReceipt {
    pub donation_id: String,
    pub queue_size: usize,
}

/// What the polling client receives on every check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PollResult {
    pub donation: Option<Donation>,
    pub top_spenders: Vec<TopSpender>,
    pub queue_size: usize,
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DonationStats {
    pub total_donations: usize,
    pub delivered: usize,
    pub undelivered: usize,
    /// Sum of amounts still held in the queue.
    pub queued_amount: i64,
    /// Sum of every leaderboard total.
    pub lifetime_amount: i64,
    pub unique_donors: usize,
    pub top_spender: Option<TopSpender>,
}

/// Raw dump of both stores.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueueSnapshot {
    pub donations: Vec<Donation>,
    pub top_spenders: Vec<TopSpender>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClearSummary {
    pub donations_removed: usize,
    pub top_spenders_removed: usize,
}

/// Age thresholds applied by the cleanup sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Delivered donations older than this are removed.
    pub delivered_retention: Duration,
    /// Any donation older than this is removed.
    pub max_age: Duration,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            delivered_retention: Duration::from_secs(DEFAULT_DELIVERED_RETENTION_SECS),
            max_age: Duration::from_secs(DEFAULT_MAX_AGE_SECS),
        }
    }
}

impl RetentionPolicy {
    pub fn cutoffs(&self, now: DateTime<Utc>) -> PurgeCutoffs {
        let now_millis = now.timestamp_millis();
        PurgeCutoffs {
            delivered_before: now_millis.saturating_sub(duration_millis(self.delivered_retention)),
            received_before: now_millis.saturating_sub(duration_millis(self.max_age)),
        }
    }
}

/// Epoch-millisecond bounds handed to a repository purge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurgeCutoffs {
    pub delivered_before: i64,
    pub received_before: i64,
}

impl PurgeCutoffs {
    pub fn is_expired(&self, donation: &Donation) -> bool {
        donation.received_at < self.received_before
            || (donation.delivered && donation.received_at < self.delivered_before)
    }
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn duration_millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}
