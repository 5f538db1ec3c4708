use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use sqlx::Row;

use crate::domain::models::deletion::{SessionDeletion, SessionDeletionStep};
use crate::storage::sqlite::connection::DbConnection;
use crate::storage::traits::DeletionStorage;

/// Progress records for resumable session deletion
#[derive(Clone)]
pub struct DeletionRepository {
    db: DbConnection,
}

impl DeletionRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DeletionStorage for DeletionRepository {
    async fn get_session_deletion(&self, session_id: &str) -> Result<Option<SessionDeletion>> {
        let row = sqlx::query(
            r#"
            SELECT session_id, registration_ids, completed_step, updated_at
            FROM session_deletions
            WHERE session_id = ?
            "#,
        )
        .bind(session_id)
        .fetch_optional(self.db.pool())
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let registration_ids: String = row.try_get("registration_ids")?;
        let completed_step: Option<String> = row.try_get("completed_step")?;
        let completed_step = match completed_step {
            Some(step) => Some(
                SessionDeletionStep::parse(&step)
                    .ok_or_else(|| anyhow!("unknown deletion step '{}'", step))?,
            ),
            None => None,
        };

        Ok(Some(SessionDeletion {
            session_id: row.try_get("session_id")?,
            registration_ids: serde_json::from_str(&registration_ids)
                .context("invalid registration_ids column")?,
            completed_step,
            updated_at: row.try_get("updated_at")?,
        }))
    }

    async fn save_session_deletion(&self, deletion: &SessionDeletion) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO session_deletions (session_id, registration_ids, completed_step, updated_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&deletion.session_id)
        .bind(serde_json::to_string(&deletion.registration_ids)?)
        .bind(deletion.completed_step.map(|step| step.as_str()))
        .bind(&deletion.updated_at)
        .execute(self.db.pool())
        .await
        .context("failed to record deletion progress")?;
        Ok(())
    }

    async fn clear_session_deletion(&self, session_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM session_deletions WHERE session_id = ?")
            .bind(session_id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }
}
