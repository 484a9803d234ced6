//! Process-local donation store bounded by a fixed queue capacity.

use std::collections::{HashMap, VecDeque};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use log::debug;

use super::donations_model::{ClearSummary, Donation, PurgeCutoffs, TopSpender};
use super::donations_traits::DonationRepositoryTrait;
use crate::constants::DEFAULT_QUEUE_CAPACITY;
use crate::errors::{Error, Result};

#[derive(Default)]
struct MemoryState {
    queue: VecDeque<Donation>,
    leaderboard: HashMap<String, TopSpender>,
}

/// Queue and leaderboard held under one lock, so an ingest is applied to
/// both or neither.
///
/// When the queue grows past `capacity` the oldest entry is evicted,
/// delivered or not.
pub struct InMemoryDonationRepository {
    capacity: usize,
    state: RwLock<MemoryState>,
}

impl InMemoryDonationRepository {
    pub fn new(capacity: usize) -> Self {
        InMemoryDonationRepository {
            capacity: capacity.max(1),
            state: RwLock::new(MemoryState::default()),
        }
    }


    fn read_state(&self) -> Result<RwLockReadGuard<'_, MemoryState>> {
        self.state
            .read()
            .map_err(|_| Error::Unexpected("donation store lock poisoned".to_string()))
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, MemoryState>> {
        self.state
            .write()
            .map_err(|_| Error::Unexpected("donation store lock poisoned".to_string()))
    }
}

impl Default for InMemoryDonationRepository {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}

#[async_trait]
impl DonationRepositoryTrait for InMemoryDonationRepository {
    async fn record(&self, donation: Donation) -> Result<()> {
        let mut state = self.write_state()?;

        let entry = state
            .leaderboard
            .entry(donation.username.clone())
            .or_insert_with(|| TopSpender {
                username: donation.username.clone(),
                display_name: donation.display_name.clone(),
                total_amount: 0,
            });
        entry.display_name = donation.display_name.clone();
        entry.total_amount = entry.total_amount.saturating_add(donation.amount);

        state.queue.push_back(donation);
        while state.queue.len() > self.capacity {
            if let Some(evicted) = state.queue.pop_front() {
                debug!("Queue full, evicted donation {}", evicted.id);
            }
        }
        Ok(())
    }

    async fn mark_delivered(&self, donation_id: &str) -> Result<bool> {
        let mut state = self.write_state()?;
        match state.queue.iter_mut().find(|d| d.id == donation_id) {
            Some(donation) => {
                donation.delivered = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn purge(&self, cutoffs: PurgeCutoffs) -> Result<usize> {
        let mut state = self.write_state()?;
        let before = state.queue.len();
        state.queue.retain(|d| !cutoffs.is_expired(d));
        Ok(before - state.queue.len())
    }

    async fn clear(&self) -> Result<ClearSummary> {
        let mut state = self.write_state()?;
        let summary = ClearSummary {
            donations_removed: state.queue.len(),
            top_spenders_removed: state.leaderboard.len(),
        };
        state.queue.clear();
        state.leaderboard.clear();
        Ok(summary)
    }

    fn oldest_undelivered(&self) -> Result<Option<Donation>> {
        let state = self.read_state()?;
        // min_by_key keeps the first of equal keys, i.e. insertion order.
        Ok(state
            .queue
            .iter()
            .filter(|d| !d.delivered)
            .min_by_key(|d| d.received_at)
            .cloned())
    }

    fn count_undelivered(&self) -> Result<usize> {
        let state = self.read_state()?;
        Ok(state.queue.iter().filter(|d| !d.delivered).count())
    }

    fn list_donations(&self) -> Result<Vec<Donation>> {
        let state = self.read_state()?;
        let mut donations: Vec<Donation> = state.queue.iter().cloned().collect();
        donations.sort_by_key(|d| d.received_at);
        Ok(donations)
    }

    fn top_spenders(&self, limit: Option<usize>) -> Result<Vec<TopSpender>> {
        let state = self.read_state()?;
        let mut ranked: Vec<TopSpender> = state.leaderboard.values().cloned().collect();
        ranked.sort_by(|a, b| {
            b.total_amount
                .cmp(&a.total_amount)
                .then_with(|| a.username.cmp(&b.username))
        });
        if let Some(limit) = limit {
            ranked.truncate(limit);
        }
        Ok(ranked)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
