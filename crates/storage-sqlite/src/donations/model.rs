//! Database models for donations and top spenders.

use diesel::prelude::*;
use saweria_relay_core::donations::{Donation, TopSpender};

/// Database model for a queued donation
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::donations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DonationDB {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub amount: i64,
    pub message: String,
    pub timestamp: String,
    pub received_at: i64,
    pub delivered: bool,
}

/// Database model for a leaderboard row
#[derive(Queryable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::top_spenders)]
#[diesel(primary_key(username))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TopSpenderDB {
    pub username: String,
    pub display_name: String,
    pub total_amount: i64,
}

// Conversion to domain models
impl From<DonationDB> for Donation {
    fn from(db: DonationDB) -> Self {
        Self {
            id: db.id,
            username: db.username,
            display_name: db.display_name,
            amount: db.amount,
            message: db.message,
            timestamp: db.timestamp,
            received_at: db.received_at,
            delivered: db.delivered,
        }
    }
}

impl From<Donation> for DonationDB {
    fn from(domain: Donation) -> Self {
        Self {
            id: domain.id,
            username: domain.username,
            display_name: domain.display_name,
            amount: domain.amount,
            message: domain.message,
            timestamp: domain.timestamp,
            received_at: domain.received_at,
            delivered: domain.delivered,
        }
    }
}

impl From<TopSpenderDB> for TopSpender {
    fn from(db: TopSpenderDB) -> Self {
        Self {
            username: db.username,
            display_name: db.display_name,
            total_amount: db.total_amount,
        }
    }
}

impl From<&Donation> for TopSpenderDB {
    /// The leaderboard row a single donation contributes.
    fn from(donation: &Donation) -> Self {
        Self {
            username: donation.username.clone(),
            display_name: donation.display_name.clone(),
            total_amount: donation.amount,
        }
    }
}
