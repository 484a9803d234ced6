use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde_json::Value;

use super::donations_model::{
    format_timestamp, ClearSummary, Donation, DonationStats, IngestReceipt, PollResult,
    QueueSnapshot, RetentionPolicy,
};
use super::donations_traits::{DonationRepositoryTrait, DonationServiceTrait};
use super::field_aliases::FieldAliases;
use crate::constants::TOP_SPENDERS_LIMIT;
use crate::errors::Result;

pub struct DonationService {
    repository: Arc<dyn DonationRepositoryTrait>,
    aliases: FieldAliases,
    retention: RetentionPolicy,
}

impl DonationService {
    pub fn new(repository: Arc<dyn DonationRepositoryTrait>, retention: RetentionPolicy) -> Self {
        DonationService {
            repository,
            aliases: FieldAliases::default(),
            retention,
        }
    }

    pub fn with_aliases(mut self, aliases: FieldAliases) -> Self {
        self.aliases = aliases;
        self
    }

    /// Ingests `payload` as if it arrived at `now`.
    pub async fn ingest_at(&self, payload: &Value, now: DateTime<Utc>) -> Result<IngestReceipt> {
        // Parsing happens before any store is touched.
        let fields = self.aliases.extract(payload)?;
        let donation = Donation::new(fields, now);
        let donation_id = donation.id.clone();

        info!(
            "Donation {} received from '{}' for {}",
            donation_id, donation.username, donation.amount
        );
        self.repository.record(donation).await?;

        let queue_size = self.repository.count_undelivered()?;
        Ok(IngestReceipt {
            donation_id,
            queue_size,
        })
    }

    /// Runs one cleanup sweep relative to `now`.
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> Result<usize> {
        let cutoffs = self.retention.cutoffs(now);
        self.repository.purge(cutoffs).await
    }

    async fn confirm(&self, donation_id: &str) -> Result<()> {
        if self.repository.mark_delivered(donation_id).await? {
            info!("Donation {} confirmed as delivered", donation_id);
        } else {
            debug!("Confirmation for unknown donation {} ignored", donation_id);
        }
        Ok(())
    }
}

#[async_trait]
impl DonationServiceTrait for DonationService {
    async fn ingest(&self, payload: &Value) -> Result<IngestReceipt> {
        self.ingest_at(payload, Utc::now()).await
    }

    async fn poll(&self, confirm_id: Option<&str>) -> Result<PollResult> {
        if let Some(id) = confirm_id.map(str::trim).filter(|id| !id.is_empty()) {
            self.confirm(id).await?;
        }

        Ok(PollResult {
            donation: self.repository.oldest_undelivered()?,
            top_spenders: self.repository.top_spenders(Some(TOP_SPENDERS_LIMIT))?,
            queue_size: self.repository.count_undelivered()?,
            timestamp: format_timestamp(Utc::now()),
        })
    }

    async fn sweep(&self) -> Result<usize> {
        self.sweep_at(Utc::now()).await
    }

    async fn clear(&self) -> Result<ClearSummary> {
        let summary = self.repository.clear().await?;
        warn!(
            "Cleared {} donations and {} leaderboard entries",
            summary.donations_removed, summary.top_spenders_removed
        );
        Ok(summary)
    }

    fn snapshot(&self) -> Result<QueueSnapshot> {
        Ok(QueueSnapshot {
            donations: self.repository.list_donations()?,
            top_spenders: self.repository.top_spenders(None)?,
        })
    }

    fn stats(&self) -> Result<DonationStats> {
        let donations = self.repository.list_donations()?;
        let leaderboard = self.repository.top_spenders(None)?;

        let delivered = donations.iter().filter(|d| d.delivered).count();
        let queued_amount = donations
            .iter()
            .filter(|d| !d.delivered)
            .fold(0i64, |acc, d| acc.saturating_add(d.amount));
        let lifetime_amount = leaderboard
            .iter()
            .fold(0i64, |acc, s| acc.saturating_add(s.total_amount));

        Ok(DonationStats {
            total_donations: donations.len(),
            delivered,
            undelivered: donations.len() - delivered,
            queued_amount,
            lifetime_amount,
            unique_donors: leaderboard.len(),
            top_spender: leaderboard.into_iter().next(),
        })
    }

    fn queue_size(&self) -> Result<usize> {
        self.repository.count_undelivered()
    }

    fn backend_name(&self) -> &'static str {
        self.repository.backend_name()
    }
}
