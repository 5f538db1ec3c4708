use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use shared::SessionStatus;
use sqlx::{sqlite::SqliteRow, Row};

use crate::domain::models::session::{parse_time, ScheduledSession};
use crate::storage::sqlite::connection::DbConnection;
use crate::storage::traits::SessionStorage;

const SESSION_COLUMNS: &str = "id, title, subject_id, teacher_id, date, start_time, end_time, \
    location, max_participants, topics, materials_needed, status, file_url, created_at, updated_at";

/// Repository for scheduled sessions
#[derive(Clone)]
pub struct SessionRepository {
    db: DbConnection,
}

impl SessionRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn row_to_session(row: &SqliteRow) -> Result<ScheduledSession> {
        let date: String = row.try_get("date")?;
        let start_time: String = row.try_get("start_time")?;
        let end_time: String = row.try_get("end_time")?;
        let topics: String = row.try_get("topics")?;
        let status: String = row.try_get("status")?;
        let max_participants: i64 = row.try_get("max_participants")?;

        Ok(ScheduledSession {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            subject_id: row.try_get("subject_id")?,
            teacher_id: row.try_get("teacher_id")?,
            date: NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .with_context(|| format!("invalid session date '{}'", date))?,
            start_time: parse_time(&start_time).ok_or_else(|| anyhow!("invalid start time '{}'", start_time))?,
            end_time: parse_time(&end_time).ok_or_else(|| anyhow!("invalid end time '{}'", end_time))?,
            location: row.try_get("location")?,
            max_participants: max_participants.max(0) as u32,
            topics: serde_json::from_str(&topics).context("invalid topics column")?,
            materials_needed: row.try_get("materials_needed")?,
            status: SessionStatus::parse(&status).unwrap_or(SessionStatus::Scheduled),
            file_url: row.try_get("file_url")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

fn date_column(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn time_column(time: chrono::NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

#[async_trait]
impl SessionStorage for SessionRepository {
    async fn store_session(&self, session: &ScheduledSession) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO scheduled_sessions ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            SESSION_COLUMNS
        ))
        .bind(&session.id)
        .bind(&session.title)
        .bind(&session.subject_id)
        .bind(&session.teacher_id)
        .bind(date_column(session.date))
        .bind(time_column(session.start_time))
        .bind(time_column(session.end_time))
        .bind(&session.location)
        .bind(session.max_participants as i64)
        .bind(serde_json::to_string(&session.topics)?)
        .bind(&session.materials_needed)
        .bind(session.status.as_str())
        .bind(&session.file_url)
        .bind(&session.created_at)
        .bind(&session.updated_at)
        .execute(self.db.pool())
        .await
        .context("failed to insert session")?;
        Ok(())
    }

    async fn get_session(&self, session_id: &str) -> Result<Option<ScheduledSession>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM scheduled_sessions WHERE id = ?",
            SESSION_COLUMNS
        ))
        .bind(session_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::row_to_session).transpose()
    }

    async fn list_sessions(&self) -> Result<Vec<ScheduledSession>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM scheduled_sessions ORDER BY date ASC, start_time ASC",
            SESSION_COLUMNS
        ))
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::row_to_session).collect()
    }

    async fn update_session(&self, session: &ScheduledSession) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE scheduled_sessions
            SET title = ?, subject_id = ?, teacher_id = ?, date = ?, start_time = ?,
                end_time = ?, location = ?, max_participants = ?, topics = ?,
                materials_needed = ?, status = ?, file_url = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&session.title)
        .bind(&session.subject_id)
        .bind(&session.teacher_id)
        .bind(date_column(session.date))
        .bind(time_column(session.start_time))
        .bind(time_column(session.end_time))
        .bind(&session.location)
        .bind(session.max_participants as i64)
        .bind(serde_json::to_string(&session.topics)?)
        .bind(&session.materials_needed)
        .bind(session.status.as_str())
        .bind(&session.file_url)
        .bind(&session.updated_at)
        .bind(&session.id)
        .execute(self.db.pool())
        .await
        .context("failed to update session")?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_file_url(&self, session_id: &str, file_url: &str, updated_at: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE scheduled_sessions SET file_url = ?, updated_at = ? WHERE id = ?")
            .bind(file_url)
            .bind(updated_at)
            .bind(session_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_session(&self, session_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM scheduled_sessions WHERE id = ?")
            .bind(session_id)
            .execute(self.db.pool())
            .await
            .context("failed to delete session")?;
        Ok(result.rows_affected() > 0)
    }
}
