use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use shared::DonationKind;
use sqlx::{sqlite::SqliteRow, Row};

use crate::domain::models::donation::Donation;
use crate::storage::sqlite::connection::DbConnection;
use crate::storage::traits::DonationStorage;

const DONATION_COLUMNS: &str = "id, session_id, registration_id, kind, amount, food_weight_kg, \
    description, institution, donation_date, created_at";

/// Repository for the donation ledger
#[derive(Clone)]
pub struct DonationRepository {
    db: DbConnection,
}

impl DonationRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn row_to_donation(row: &SqliteRow) -> Result<Donation> {
        let kind: String = row.try_get("kind")?;
        let donation_date: String = row.try_get("donation_date")?;

        Ok(Donation {
            id: row.try_get("id")?,
            session_id: row.try_get("session_id")?,
            registration_id: row.try_get("registration_id")?,
            kind: DonationKind::parse(&kind).ok_or_else(|| anyhow!("unknown donation kind '{}'", kind))?,
            amount: row.try_get("amount")?,
            food_weight_kg: row.try_get("food_weight_kg")?,
            description: row.try_get("description")?,
            institution: row.try_get("institution")?,
            donation_date: NaiveDate::parse_from_str(&donation_date, "%Y-%m-%d")
                .with_context(|| format!("invalid donation date '{}'", donation_date))?,
            created_at: row.try_get("created_at")?,
        })
    }

    async fn insert(&self, donation: &Donation, or_ignore: bool) -> Result<bool> {
        let verb = if or_ignore { "INSERT OR IGNORE" } else { "INSERT" };
        let result = sqlx::query(&format!(
            "{} INTO donations ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            verb, DONATION_COLUMNS
        ))
        .bind(&donation.id)
        .bind(&donation.session_id)
        .bind(&donation.registration_id)
        .bind(donation.kind.as_str())
        .bind(donation.amount)
        .bind(donation.food_weight_kg)
        .bind(&donation.description)
        .bind(&donation.institution)
        .bind(donation.donation_date.format("%Y-%m-%d").to_string())
        .bind(&donation.created_at)
        .execute(self.db.pool())
        .await
        .context("failed to insert donation")?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl DonationStorage for DonationRepository {
    async fn store_donation(&self, donation: &Donation) -> Result<()> {
        self.insert(donation, false).await?;
        Ok(())
    }

    async fn insert_money_donation_if_absent(&self, donation: &Donation) -> Result<bool> {
        if donation.kind != DonationKind::Money || donation.registration_id.is_none() {
            return Err(anyhow!(
                "guarded insert needs a money donation linked to a registration"
            ));
        }
        // The partial unique index turns a duplicate into an ignored insert
        self.insert(donation, true).await
    }

    async fn find_money_donation_for_registration(&self, registration_id: &str) -> Result<Option<Donation>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM donations WHERE registration_id = ? AND kind = 'dinheiro'",
            DONATION_COLUMNS
        ))
        .bind(registration_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::row_to_donation).transpose()
    }

    async fn list_donations(&self) -> Result<Vec<Donation>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM donations ORDER BY donation_date DESC, created_at DESC",
            DONATION_COLUMNS
        ))
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::row_to_donation).collect()
    }

    async fn list_money_donations(&self) -> Result<Vec<Donation>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM donations
            WHERE kind = 'dinheiro' AND amount IS NOT NULL AND amount > 0
            ORDER BY donation_date DESC, created_at DESC
            "#,
            DONATION_COLUMNS
        ))
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::row_to_donation).collect()
    }

    async fn total_food_weight_kg(&self) -> Result<f64> {
        let total: f64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(food_weight_kg), 0.0) FROM donations WHERE food_weight_kg > 0",
        )
        .fetch_one(self.db.pool())
        .await?;
        Ok(total)
    }

    async fn unlink_session(&self, session_id: &str) -> Result<u32> {
        let result = sqlx::query("UPDATE donations SET session_id = NULL WHERE session_id = ?")
            .bind(session_id)
            .execute(self.db.pool())
            .await
            .context("failed to unlink donations from session")?;
        Ok(result.rows_affected() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn money(id: &str, registration_id: Option<&str>, session_id: Option<&str>, amount: Option<f64>) -> Donation {
        Donation {
            id: id.to_string(),
            session_id: session_id.map(str::to_string),
            registration_id: registration_id.map(str::to_string),
            kind: DonationKind::Money,
            amount,
            food_weight_kg: None,
            description: None,
            institution: None,
            donation_date: NaiveDate::from_ymd_opt(2025, 5, 10).unwrap(),
            created_at: "2025-05-10T18:00:00+00:00".to_string(),
        }
    }

    async fn setup_test() -> DonationRepository {
        let db = DbConnection::init_in_memory().await.expect("Failed to create test database");
        DonationRepository::new(db)
    }

    #[tokio::test]
    async fn test_guarded_insert_writes_once_per_registration() {
        let repo = setup_test().await;

        let first = money("d1", Some("r1"), Some("s1"), Some(3.0));
        let second = money("d2", Some("r1"), Some("s1"), Some(3.0));

        assert!(repo.insert_money_donation_if_absent(&first).await.unwrap());
        assert!(!repo.insert_money_donation_if_absent(&second).await.unwrap());

        let all = repo.list_donations().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, "d1");
        assert_eq!(
            repo.find_money_donation_for_registration("r1").await.unwrap().map(|d| d.id),
            Some("d1".to_string())
        );
    }

    #[tokio::test]
    async fn test_guard_only_applies_to_money_entries() {
        let repo = setup_test().await;
        let mut food = money("d1", Some("r1"), Some("s1"), None);
        food.kind = DonationKind::InKind;
        food.food_weight_kg = Some(2.0);

        repo.store_donation(&food).await.unwrap();
        assert!(repo
            .insert_money_donation_if_absent(&money("d2", Some("r1"), Some("s1"), Some(5.0)))
            .await
            .unwrap());
        assert_eq!(repo.list_donations().await.unwrap().len(), 2);

        // Manual entries without a registration never collide
        repo.store_donation(&money("d3", None, None, Some(10.0))).await.unwrap();
        repo.store_donation(&money("d4", None, None, Some(10.0))).await.unwrap();
        assert_eq!(repo.list_donations().await.unwrap().len(), 4);

        assert!(repo.insert_money_donation_if_absent(&food).await.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_guarded_inserts_leave_one_row() {
        let repo = setup_test().await;

        let mut handles = Vec::new();
        for i in 0..8 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.insert_money_donation_if_absent(&money(&format!("d{}", i), Some("r1"), Some("s1"), Some(3.0)))
                    .await
                    .unwrap()
            }));
        }

        let mut inserted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                inserted += 1;
            }
        }
        assert_eq!(inserted, 1);
        assert_eq!(repo.list_donations().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unlink_session_keeps_rows() {
        let repo = setup_test().await;
        repo.store_donation(&money("d1", Some("r1"), Some("s1"), Some(3.0))).await.unwrap();
        repo.store_donation(&money("d2", Some("r2"), Some("s2"), Some(4.0))).await.unwrap();

        assert_eq!(repo.unlink_session("s1").await.unwrap(), 1);

        let all = repo.list_donations().await.unwrap();
        assert_eq!(all.len(), 2);
        let unlinked = all.iter().find(|d| d.id == "d1").unwrap();
        assert_eq!(unlinked.session_id, None);
        assert_eq!(unlinked.registration_id.as_deref(), Some("r1"));
    }

    #[tokio::test]
    async fn test_list_money_donations_skips_empty_amounts() {
        let repo = setup_test().await;
        repo.store_donation(&money("d1", Some("r1"), Some("s1"), Some(3.0))).await.unwrap();
        repo.store_donation(&money("d2", Some("r2"), Some("s1"), None)).await.unwrap();
        repo.store_donation(&money("d3", Some("r3"), Some("s1"), Some(0.0))).await.unwrap();

        let money_rows = repo.list_money_donations().await.unwrap();
        assert_eq!(money_rows.len(), 1);
        assert_eq!(money_rows[0].id, "d1");
    }

    #[tokio::test]
    async fn test_total_food_weight_ignores_money_rows() {
        let repo = setup_test().await;
        assert_eq!(repo.total_food_weight_kg().await.unwrap(), 0.0);

        let mut rice = money("d1", None, Some("s1"), None);
        rice.kind = DonationKind::InKind;
        rice.food_weight_kg = Some(7.5);
        let mut beans = money("d2", None, None, None);
        beans.kind = DonationKind::InKind;
        beans.food_weight_kg = Some(2.5);
        repo.store_donation(&rice).await.unwrap();
        repo.store_donation(&beans).await.unwrap();
        repo.store_donation(&money("d3", Some("r1"), Some("s1"), Some(30.0))).await.unwrap();

        assert_eq!(repo.total_food_weight_kg().await.unwrap(), 10.0);
    }
}
