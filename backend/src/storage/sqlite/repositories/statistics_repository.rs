use anyhow::Result;
use async_trait::async_trait;
use sqlx::Row;

use crate::domain::models::statistics::{PlatformStatistics, StatisticField};
use crate::storage::sqlite::connection::DbConnection;
use crate::storage::traits::StatisticsStorage;

/// Per-year platform counters
#[derive(Clone)]
pub struct StatisticsRepository {
    db: DbConnection,
}

impl StatisticsRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StatisticsStorage for StatisticsRepository {
    async fn increment(&self, year: i32, field: StatisticField, updated_at: &str) -> Result<()> {
        // Column name comes from a closed enum, never from input
        let column = field.column();
        sqlx::query(&format!(
            r#"
            INSERT INTO platform_statistics (year, {column}, updated_at)
            VALUES (?, 1, ?)
            ON CONFLICT(year) DO UPDATE SET {column} = {column} + 1, updated_at = excluded.updated_at
            "#,
            column = column
        ))
        .bind(year)
        .bind(updated_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_statistics(&self, year: i32) -> Result<Option<PlatformStatistics>> {
        let row = sqlx::query(
            "SELECT year, total_classes, total_students FROM platform_statistics WHERE year = ?",
        )
        .bind(year)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(|r| PlatformStatistics {
            year: r.get::<i64, _>("year") as i32,
            total_classes: r.get::<i64, _>("total_classes") as u32,
            total_students: r.get::<i64, _>("total_students") as u32,
            total_food_kg: 0.0,
        }))
    }
}
