//! Yearly platform counters shown on the public landing page.

use chrono::{Datelike, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::error::DomainResult;
use crate::domain::models::statistics::{PlatformStatistics, StatisticField};
use crate::storage::traits::{Connection, DonationStorage, StatisticsStorage};

#[derive(Clone)]
pub struct StatisticsService<C: Connection> {
    statistics_repository: C::StatisticsRepository,
    donation_repository: C::DonationRepository,
}

impl<C: Connection> StatisticsService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            statistics_repository: connection.create_statistics_repository(),
            donation_repository: connection.create_donation_repository(),
        }
    }

    pub async fn increment(&self, field: StatisticField) -> DomainResult<()> {
        let now = Utc::now();
        self.statistics_repository
            .increment(now.year(), field, &now.to_rfc3339())
            .await?;
        info!("Incremented {} for {}", field.column(), now.year());
        Ok(())
    }

    /// Counter bumps that must not fail the operation that triggered them
    pub async fn increment_quietly(&self, field: StatisticField) {
        if let Err(e) = self.increment(field).await {
            warn!("Failed to increment {}: {}", field.column(), e);
        }
    }

    /// Counters for the current year, zeros when nothing was recorded yet,
    /// plus the all-time food total
    pub async fn current(&self) -> DomainResult<PlatformStatistics> {
        let year = Utc::now().year();
        let mut statistics = self
            .statistics_repository
            .get_statistics(year)
            .await?
            .unwrap_or(PlatformStatistics {
                year,
                ..Default::default()
            });
        statistics.total_food_kg = self.donation_repository.total_food_weight_kg().await?;
        Ok(statistics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::finance::ManualDonationCommand;
    use crate::domain::finance_service::FinanceService;
    use crate::storage::DbConnection;
    use chrono::NaiveDate;
    use shared::DonationKind;

    async fn setup_test() -> StatisticsService<DbConnection> {
        let db = DbConnection::init_in_memory().await.expect("Failed to create test database");
        StatisticsService::new(Arc::new(db))
    }

    #[tokio::test]
    async fn test_current_defaults_to_zero() {
        let service = setup_test().await;
        let statistics = service.current().await.unwrap();

        assert_eq!(statistics.year, Utc::now().year());
        assert_eq!(statistics.total_classes, 0);
        assert_eq!(statistics.total_students, 0);
        assert_eq!(statistics.total_food_kg, 0.0);
    }

    #[tokio::test]
    async fn test_increments_accumulate_per_field() {
        let service = setup_test().await;
        service.increment(StatisticField::TotalStudents).await.unwrap();
        service.increment(StatisticField::TotalStudents).await.unwrap();
        service.increment_quietly(StatisticField::TotalClasses).await;

        let statistics = service.current().await.unwrap();
        assert_eq!(statistics.total_students, 2);
        assert_eq!(statistics.total_classes, 1);
    }

    #[tokio::test]
    async fn test_food_total_spans_every_year() {
        let db = DbConnection::init_in_memory().await.expect("Failed to create test database");
        let finance = FinanceService::new(Arc::new(db.clone()));
        for (year, weight) in [(2023, 3.5), (2025, 6.0)] {
            finance
                .record_manual_donation(ManualDonationCommand {
                    kind: DonationKind::InKind,
                    session_id: None,
                    amount: None,
                    food_weight_kg: Some(weight),
                    description: Some("feijão".to_string()),
                    institution: None,
                    donation_date: NaiveDate::from_ymd_opt(year, 3, 1),
                })
                .await
                .unwrap();
        }

        let service = StatisticsService::new(Arc::new(db));
        assert_eq!(service.current().await.unwrap().total_food_kg, 9.5);
    }
}
