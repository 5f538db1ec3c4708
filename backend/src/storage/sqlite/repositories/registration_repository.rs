use anyhow::{Context, Result};
use async_trait::async_trait;
use shared::PledgeType;
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite};

use crate::domain::models::registration::{PaymentDetail, Registration};
use crate::storage::sqlite::connection::DbConnection;
use crate::storage::traits::{PaymentDetailStorage, RegistrationStorage};

const REGISTRATION_COLUMNS: &str = "id, session_id, student_name, student_email, student_phone, \
    student_registration_number, pledge_type, pledge_amount, confirmed_presence, attended, \
    created_at, updated_at";

/// Repository for registration operations
#[derive(Clone)]
pub struct RegistrationRepository {
    db: DbConnection,
}

impl RegistrationRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn row_to_registration(row: &SqliteRow) -> Result<Registration> {
        let pledge_type: Option<String> = row.try_get("pledge_type")?;
        // Unknown legacy spellings are read as "no pledge" rather than failing the listing
        let pledge_type = pledge_type.as_deref().and_then(PledgeType::parse);

        Ok(Registration {
            id: row.try_get("id")?,
            session_id: row.try_get("session_id")?,
            student_name: row.try_get("student_name")?,
            student_email: row.try_get("student_email")?,
            student_phone: row.try_get("student_phone")?,
            student_registration_number: row.try_get("student_registration_number")?,
            pledge_type,
            pledge_amount: row.try_get("pledge_amount")?,
            confirmed_presence: row.try_get("confirmed_presence")?,
            attended: row.try_get("attended")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl RegistrationStorage for RegistrationRepository {
    async fn store_registration(&self, registration: &Registration) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO registrations (
                id, session_id, student_name, student_email, student_phone,
                student_registration_number, pledge_type, pledge_amount,
                confirmed_presence, attended, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&registration.id)
        .bind(&registration.session_id)
        .bind(&registration.student_name)
        .bind(&registration.student_email)
        .bind(&registration.student_phone)
        .bind(&registration.student_registration_number)
        .bind(registration.pledge_type.map(|p| p.as_str()))
        .bind(&registration.pledge_amount)
        .bind(registration.confirmed_presence)
        .bind(registration.attended)
        .bind(&registration.created_at)
        .bind(&registration.updated_at)
        .execute(self.db.pool())
        .await
        .context("failed to insert registration")?;
        Ok(())
    }

    async fn get_registration(&self, registration_id: &str) -> Result<Option<Registration>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM registrations WHERE id = ?",
            REGISTRATION_COLUMNS
        ))
        .bind(registration_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::row_to_registration).transpose()
    }

    async fn list_registrations(&self, session_id: Option<&str>) -> Result<Vec<Registration>> {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM registrations", REGISTRATION_COLUMNS));
        if let Some(session_id) = session_id {
            query.push(" WHERE session_id = ").push_bind(session_id);
        }
        query.push(" ORDER BY created_at DESC, id DESC");

        let rows = query.build().fetch_all(self.db.pool()).await?;
        rows.iter().map(Self::row_to_registration).collect()
    }

    async fn list_registration_ids_for_session(&self, session_id: &str) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT id FROM registrations WHERE session_id = ?")
            .bind(session_id)
            .fetch_all(self.db.pool())
            .await?;
        Ok(rows.iter().map(|row| row.get("id")).collect())
    }

    async fn count_registrations_for_session(&self, session_id: &str) -> Result<u32> {
        let count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM registrations WHERE session_id = ?")
            .bind(session_id)
            .fetch_one(self.db.pool())
            .await?
            .get("n");
        Ok(count as u32)
    }

    async fn update_attendance(&self, registration_id: &str, attended: bool, updated_at: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE registrations
            SET attended = ?, confirmed_presence = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(attended)
        .bind(attended)
        .bind(updated_at)
        .bind(registration_id)
        .execute(self.db.pool())
        .await
        .context("failed to update attendance")?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_confirmed_presence(&self, registration_id: &str, confirmed: bool, updated_at: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE registrations SET confirmed_presence = ?, updated_at = ? WHERE id = ?",
        )
        .bind(confirmed)
        .bind(updated_at)
        .bind(registration_id)
        .execute(self.db.pool())
        .await
        .context("failed to update confirmed presence")?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_registration(&self, registration_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM registrations WHERE id = ?")
            .bind(registration_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_registrations_for_session(&self, session_id: &str) -> Result<u32> {
        let result = sqlx::query("DELETE FROM registrations WHERE session_id = ?")
            .bind(session_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() as u32)
    }
}

/// Repository for payment details of advance-payment registrations
#[derive(Clone)]
pub struct PaymentDetailRepository {
    db: DbConnection,
}

impl PaymentDetailRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PaymentDetailStorage for PaymentDetailRepository {
    async fn store_payment_detail(&self, detail: &PaymentDetail) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO payment_details (
                id, registration_id, payment_type, amount, proof_file_name,
                payment_date, status, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&detail.id)
        .bind(&detail.registration_id)
        .bind(&detail.payment_type)
        .bind(detail.amount)
        .bind(&detail.proof_file_name)
        .bind(&detail.payment_date)
        .bind(&detail.status)
        .bind(&detail.created_at)
        .execute(self.db.pool())
        .await
        .context("failed to insert payment detail")?;
        Ok(())
    }

    async fn list_payment_details(&self, registration_id: &str) -> Result<Vec<PaymentDetail>> {
        let rows = sqlx::query(
            r#"
            SELECT id, registration_id, payment_type, amount, proof_file_name,
                   payment_date, status, created_at
            FROM payment_details
            WHERE registration_id = ?
            ORDER BY created_at ASC
            "#,
        )
        .bind(registration_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter()
            .map(|row| {
                Ok(PaymentDetail {
                    id: row.try_get("id")?,
                    registration_id: row.try_get("registration_id")?,
                    payment_type: row.try_get("payment_type")?,
                    amount: row.try_get("amount")?,
                    proof_file_name: row.try_get("proof_file_name")?,
                    payment_date: row.try_get("payment_date")?,
                    status: row.try_get("status")?,
                    created_at: row.try_get("created_at")?,
                })
            })
            .collect()
    }

    async fn delete_payment_details_for_registrations(&self, registration_ids: &[String]) -> Result<u32> {
        if registration_ids.is_empty() {
            return Ok(0);
        }

        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new("DELETE FROM payment_details WHERE registration_id IN (");
        let mut separated = query.separated(", ");
        for id in registration_ids {
            separated.push_bind(id.as_str());
        }
        separated.push_unseparated(")");

        let result = query.build().execute(self.db.pool()).await?;
        Ok(result.rows_affected() as u32)
    }
}
