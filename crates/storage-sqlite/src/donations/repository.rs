use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel::SqliteConnection;
use saweria_relay_core::donations::{
    ClearSummary, Donation, DonationRepositoryTrait, PurgeCutoffs, TopSpender,
};
use saweria_relay_core::Result;

use super::model::{DonationDB, TopSpenderDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::{donations, top_spenders};

/// Durable queue and leaderboard. Reads use the pool; every write goes
/// through the writer actor so it runs in an immediate transaction.
pub struct DonationRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl DonationRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        DonationRepository { pool, writer }
    }
}

fn to_count(n: i64) -> usize {
    usize::try_from(n).unwrap_or_default()
}

#[async_trait]
impl DonationRepositoryTrait for DonationRepository {
    async fn record(&self, donation: Donation) -> Result<()> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                let credit = TopSpenderDB::from(&donation);
                let donation_db = DonationDB::from(donation);

                diesel::insert_into(donations::table)
                    .values(&donation_db)
                    .execute(conn)
                    .into_core()?;

                diesel::insert_into(top_spenders::table)
                    .values(&credit)
                    .on_conflict(top_spenders::username)
                    .do_update()
                    .set((
                        top_spenders::display_name.eq(excluded(top_spenders::display_name)),
                        top_spenders::total_amount
                            .eq(top_spenders::total_amount + excluded(top_spenders::total_amount)),
                    ))
                    .execute(conn)
                    .into_core()?;
                Ok(())
            })
            .await
    }

    async fn mark_delivered(&self, donation_id: &str) -> Result<bool> {
        let donation_id = donation_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<bool> {
                let updated = diesel::update(donations::table.find(&donation_id))
                    .set(donations::delivered.eq(true))
                    .execute(conn)
                    .into_core()?;
                Ok(updated > 0)
            })
            .await
    }

    async fn purge(&self, cutoffs: PurgeCutoffs) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                diesel::delete(
                    donations::table.filter(
                        donations::received_at.lt(cutoffs.received_before).or(donations::delivered
                            .eq(true)
                            .and(donations::received_at.lt(cutoffs.delivered_before))),
                    ),
                )
                .execute(conn)
                .into_core()
            })
            .await
    }

    async fn clear(&self) -> Result<ClearSummary> {
        self.writer
            .exec(|conn: &mut SqliteConnection| -> Result<ClearSummary> {
                let donations_removed = diesel::delete(donations::table)
                    .execute(conn)
                    .into_core()?;
                let top_spenders_removed = diesel::delete(top_spenders::table)
                    .execute(conn)
                    .into_core()?;
                Ok(ClearSummary {
                    donations_removed,
                    top_spenders_removed,
                })
            })
            .await
    }

    fn oldest_undelivered(&self) -> Result<Option<Donation>> {
        let mut conn = get_connection(&self.pool)?;
        let oldest = donations::table
            .filter(donations::delivered.eq(false))
            .order((donations::received_at.asc(), donations::id.asc()))
            .select(DonationDB::as_select())
            .first::<DonationDB>(&mut conn)
            .optional()
            .into_core()?;
        Ok(oldest.map(Donation::from))
    }

    fn count_undelivered(&self) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        let count = donations::table
            .filter(donations::delivered.eq(false))
            .count()
            .get_result::<i64>(&mut conn)
            .into_core()?;
        Ok(to_count(count))
    }

    fn list_donations(&self) -> Result<Vec<Donation>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = donations::table
            .order((donations::received_at.asc(), donations::id.asc()))
            .select(DonationDB::as_select())
            .load::<DonationDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(Donation::from).collect())
    }

    fn top_spenders(&self, limit: Option<usize>) -> Result<Vec<TopSpender>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = top_spenders::table
            .order((top_spenders::total_amount.desc(), top_spenders::username.asc()))
            .select(TopSpenderDB::as_select())
            .into_boxed();
        if let Some(limit) = limit {
            query = query.limit(i64::try_from(limit).unwrap_or(i64::MAX));
        }
        let rows = query.load::<TopSpenderDB>(&mut conn).into_core()?;
        Ok(rows.into_iter().map(TopSpender::from).collect())
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, init, run_migrations, write_actor};
    use chrono::{Duration, TimeZone, Utc};
    use saweria_relay_core::donations::DonationFields;
    use tempfile::{tempdir, TempDir};

    fn setup() -> (DonationRepository, TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("relay.db");
        let db_path = init(path.to_str().unwrap()).unwrap();
        let pool = create_pool(&db_path).unwrap();
        run_migrations(&pool).unwrap();
        let writer = write_actor::spawn_writer((*pool).clone());
        (DonationRepository::new(pool, writer), dir)
    }

    fn donation(username: &str, amount: i64, offset_secs: i64) -> Donation {
        let base = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        Donation::new(
            DonationFields {
                username: username.to_string(),
                amount,
                message: format!("from {username}"),
            },
            base + Duration::seconds(offset_secs),
        )
    }

    #[tokio::test]
    async fn record_persists_donation_and_credit() {
        let (repo, _dir) = setup();
        let d = donation("Budi", 5000, 0);
        repo.record(d.clone()).await.unwrap();

        let stored = repo.list_donations().unwrap();
        assert_eq!(stored, vec![d]);

        let top = repo.top_spenders(None).unwrap();
        assert_eq!(
            top,
            vec![TopSpender {
                username: "Budi".to_string(),
                display_name: "Budi".to_string(),
                total_amount: 5000,
            }]
        );
    }

    #[tokio::test]
    async fn upsert_accumulates_totals() {
        let (repo, _dir) = setup();
        for (i, amount) in [100, 200, 300].into_iter().enumerate() {
            repo.record(donation("Sari", amount, i as i64)).await.unwrap();
        }
        repo.record(donation("Budi", 1000, 5)).await.unwrap();

        let top = repo.top_spenders(Some(10)).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].username, "Budi");
        assert_eq!(top[1].total_amount, 600);
    }

    #[tokio::test]
    async fn duplicate_id_rolls_back_leaderboard_credit() {
        let (repo, _dir) = setup();
        let d = donation("Budi", 100, 0);
        repo.record(d.clone()).await.unwrap();

        assert!(repo.record(d).await.is_err());
        assert_eq!(repo.list_donations().unwrap().len(), 1);
        assert_eq!(repo.top_spenders(None).unwrap()[0].total_amount, 100);
    }

    #[tokio::test]
    async fn oldest_undelivered_and_confirm() {
        let (repo, _dir) = setup();
        let late = donation("late", 1, 30);
        let early = donation("early", 1, 10);
        let early_id = early.id.clone();
        repo.record(late).await.unwrap();
        repo.record(early).await.unwrap();

        assert_eq!(repo.count_undelivered().unwrap(), 2);
        assert_eq!(repo.oldest_undelivered().unwrap().unwrap().username, "early");

        assert!(repo.mark_delivered(&early_id).await.unwrap());
        assert!(repo.mark_delivered(&early_id).await.unwrap());
        assert!(!repo.mark_delivered("unknown").await.unwrap());

        assert_eq!(repo.count_undelivered().unwrap(), 1);
        assert_eq!(repo.oldest_undelivered().unwrap().unwrap().username, "late");
    }

    #[tokio::test]
    async fn equal_received_at_serves_first_recorded() {
        let (repo, _dir) = setup();
        let first = donation("first", 1, 0);
        let second = donation("second", 1, 0);
        assert_eq!(first.received_at, second.received_at);
        let first_id = first.id.clone();
        repo.record(first).await.unwrap();
        repo.record(second).await.unwrap();

        assert_eq!(repo.oldest_undelivered().unwrap().unwrap().username, "first");
        let listed: Vec<String> = repo
            .list_donations()
            .unwrap()
            .into_iter()
            .map(|d| d.username)
            .collect();
        assert_eq!(listed, vec!["first", "second"]);

        repo.mark_delivered(&first_id).await.unwrap();
        assert_eq!(repo.oldest_undelivered().unwrap().unwrap().username, "second");
    }

    #[tokio::test]
    async fn empty_store_has_nothing_to_serve() {
        let (repo, _dir) = setup();
        assert!(repo.oldest_undelivered().unwrap().is_none());
        assert_eq!(repo.count_undelivered().unwrap(), 0);
        assert!(repo.top_spenders(Some(10)).unwrap().is_empty());
    }

    #[tokio::test]
    async fn purge_honours_both_cutoffs() {
        let (repo, _dir) = setup();
        let ancient = donation("ancient", 1, 0);
        let delivered = donation("delivered", 1, 100);
        let delivered_id = delivered.id.clone();
        let pending = donation("pending", 1, 100);
        repo.record(ancient.clone()).await.unwrap();
        repo.record(delivered).await.unwrap();
        repo.record(pending).await.unwrap();
        repo.mark_delivered(&delivered_id).await.unwrap();

        let removed = repo
            .purge(PurgeCutoffs {
                delivered_before: ancient.received_at + 200_000,
                received_before: ancient.received_at + 50_000,
            })
            .await
            .unwrap();

        assert_eq!(removed, 2);
        let left = repo.list_donations().unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].username, "pending");
        assert_eq!(repo.top_spenders(None).unwrap().len(), 3);
    }

    #[tokio::test]
    async fn clear_empties_both_tables() {
        let (repo, _dir) = setup();
        repo.record(donation("a", 1, 0)).await.unwrap();
        repo.record(donation("b", 1, 1)).await.unwrap();
        repo.record(donation("a", 1, 2)).await.unwrap();

        let summary = repo.clear().await.unwrap();
        assert_eq!(summary.donations_removed, 3);
        assert_eq!(summary.top_spenders_removed, 2);
        assert!(repo.list_donations().unwrap().is_empty());
        assert!(repo.top_spenders(None).unwrap().is_empty());
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let (repo, _dir) = setup();
        run_migrations(&repo.pool).unwrap();
        assert_eq!(repo.backend_name(), "sqlite");
    }
}
