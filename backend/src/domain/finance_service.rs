//! Transparency view over the donation ledger.
use chrono::{Datelike, Utc};
use shared::DonationKind;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tracing::info;

use crate::domain::commands::finance::{
    FinanceSummaryResult, ManualDonationCommand, SessionTotal, TransparencyReport,
};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::models::donation::Donation;
use crate::storage::traits::{Connection, DonationStorage, SessionStorage};

pub const UNTITLED_SESSION: &str = "Aulão sem título";

#[derive(Clone)]
pub struct FinanceService<C: Connection> {
    donation_repository: C::DonationRepository,
    session_repository: C::SessionRepository,
}

impl<C: Connection> FinanceService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            donation_repository: connection.create_donation_repository(),
            session_repository: connection.create_session_repository(),
        }
    }

    /// Money totals grouped by session, most recent session first.
    /// Entries whose session was deleted are grouped together.
    pub async fn finance_summary(&self) -> DomainResult<FinanceSummaryResult> {
        let donations = self.donation_repository.list_money_donations().await?;
        let sessions: HashMap<String, (String, chrono::NaiveDate)> = self
            .session_repository
            .list_sessions()
            .await?
            .into_iter()
            .map(|session| (session.id, (session.title, session.date)))
            .collect();

        let mut totals: HashMap<Option<String>, f64> = HashMap::new();
        let mut total_money = 0.0;
        for donation in &donations {
            let amount = donation.amount.unwrap_or(0.0);
            if amount <= 0.0 {
                continue;
            }
            total_money += amount;
            // A dangling session id counts as unlinked
            let key = donation
                .session_id
                .clone()
                .filter(|id| sessions.contains_key(id));
            *totals.entry(key).or_insert(0.0) += amount;
        }

        let mut by_session: Vec<SessionTotal> = totals
            .into_iter()
            .map(|(session_id, money_amount)| {
                let linked = session_id.as_ref().and_then(|id| sessions.get(id));
                SessionTotal {
                    session_title: linked
                        .map(|(title, _)| title.clone())
                        .unwrap_or_else(|| UNTITLED_SESSION.to_string()),
                    session_date: linked.map(|(_, date)| *date),
                    session_id,
                    money_amount,
                }
            })
            .collect();
        // Newest first, the unlinked group last
        by_session.sort_by(|a, b| b.session_date.cmp(&a.session_date));

        let sessions_with_donations = by_session.iter().filter(|t| t.session_id.is_some()).count() as u32;
        Ok(FinanceSummaryResult {
            total_money,
            by_session,
            sessions_with_donations,
        })
    }

    /// Ledger entry typed in by an administrator, never linked to a registration
    pub async fn record_manual_donation(&self, command: ManualDonationCommand) -> DomainResult<Donation> {
        match command.kind {
            DonationKind::Money if !command.amount.map(|a| a.is_finite() && a > 0.0).unwrap_or(false) => {
                return Err(DomainError::validation("Money donations need a positive amount"));
            }
            DonationKind::InKind
                if !command.food_weight_kg.map(|w| w.is_finite() && w > 0.0).unwrap_or(false) =>
            {
                return Err(DomainError::validation("Food donations need a positive weight"));
            }
            _ => {}
        }

        let session_id = command
            .session_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
        if let Some(session_id) = &session_id {
            if self.session_repository.get_session(session_id).await?.is_none() {
                return Err(DomainError::not_found(format!("Session {}", session_id)));
            }
        }

        let now = Utc::now();
        let donation = Donation {
            id: uuid::Uuid::new_v4().to_string(),
            session_id,
            registration_id: None,
            kind: command.kind,
            amount: command.amount,
            food_weight_kg: command.food_weight_kg,
            description: trimmed(command.description),
            institution: trimmed(command.institution),
            donation_date: command.donation_date.unwrap_or_else(|| now.date_naive()),
            created_at: now.to_rfc3339(),
        };
        self.donation_repository.store_donation(&donation).await?;

        info!("Recorded manual {} donation {}", donation.kind, donation.id);
        Ok(donation)
    }

    pub async fn list_donations(&self) -> DomainResult<Vec<Donation>> {
        Ok(self.donation_repository.list_donations().await?)
    }

    /// Ledger entries and totals for one year, the current one by default
    pub async fn transparency_report(&self, year: Option<i32>) -> DomainResult<TransparencyReport> {
        let year = year.unwrap_or_else(|| Utc::now().year());
        if !(2000..=9999).contains(&year) {
            return Err(DomainError::validation(format!("Invalid year {}", year)));
        }

        let all = self.donation_repository.list_donations().await?;
        let mut available_years: Vec<i32> = all
            .iter()
            .map(|d| d.donation_date.year())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .rev()
            .collect();
        if available_years.is_empty() {
            available_years.push(Utc::now().year());
        }

        let donations: Vec<Donation> = all.into_iter().filter(|d| d.donation_date.year() == year).collect();
        let total_money: f64 = donations
            .iter()
            .filter(|d| d.kind == DonationKind::Money)
            .filter_map(|d| d.amount)
            .filter(|a| *a > 0.0)
            .sum();
        let total_food_kg: f64 = donations
            .iter()
            .filter_map(|d| d.food_weight_kg)
            .filter(|w| *w > 0.0)
            .sum();
        let institutions = donations
            .iter()
            .filter_map(|d| d.institution.as_deref())
            .map(str::to_lowercase)
            .collect::<HashSet<_>>()
            .len() as u32;
        let sessions_held = self
            .session_repository
            .list_sessions()
            .await?
            .iter()
            .filter(|s| s.date.year() == year)
            .count() as u32;

        Ok(TransparencyReport {
            year,
            available_years,
            total_money,
            total_food_kg,
            institutions,
            sessions_held,
            donations,
        })
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sqlite::test_support::{sample_session, seed_registration};
    use crate::storage::DbConnection;
    use chrono::NaiveDate;
    use shared::PledgeType;

    async fn setup_test() -> (FinanceService<DbConnection>, DbConnection) {
        let db = DbConnection::init_in_memory().await.expect("Failed to create test database");
        let sessions = db.create_session_repository();
        let mut may = sample_session("may");
        may.title = "Cálculo".to_string();
        sessions.store_session(&may).await.unwrap();
        let mut june = sample_session("june");
        june.title = "Física".to_string();
        june.date = NaiveDate::from_ymd_opt(2025, 6, 7).unwrap();
        sessions.store_session(&june).await.unwrap();
        (FinanceService::new(Arc::new(db.clone())), db)
    }

    fn money(session_id: Option<&str>, amount: f64) -> ManualDonationCommand {
        ManualDonationCommand {
            kind: DonationKind::Money,
            session_id: session_id.map(str::to_string),
            amount: Some(amount),
            food_weight_kg: None,
            description: None,
            institution: None,
            donation_date: None,
        }
    }

    #[tokio::test]
    async fn test_summary_groups_by_session() {
        let (service, _db) = setup_test().await;
        service.record_manual_donation(money(Some("may"), 10.0)).await.unwrap();
        service.record_manual_donation(money(Some("may"), 2.5)).await.unwrap();
        service.record_manual_donation(money(Some("june"), 5.0)).await.unwrap();
        service.record_manual_donation(money(None, 1.0)).await.unwrap();
        service
            .record_manual_donation(ManualDonationCommand {
                kind: DonationKind::InKind,
                session_id: Some("june".to_string()),
                amount: None,
                food_weight_kg: Some(3.0),
                description: Some("arroz".to_string()),
                institution: None,
                donation_date: None,
            })
            .await
            .unwrap();

        let summary = service.finance_summary().await.unwrap();

        assert_eq!(summary.total_money, 18.5);
        assert_eq!(summary.sessions_with_donations, 2);
        let titles: Vec<_> = summary.by_session.iter().map(|t| t.session_title.as_str()).collect();
        assert_eq!(titles, vec!["Física", "Cálculo", UNTITLED_SESSION]);
        assert_eq!(summary.by_session[1].money_amount, 12.5);
        assert_eq!(summary.by_session[2].session_id, None);
    }

    #[tokio::test]
    async fn test_unlinked_attendance_donations_show_as_untitled() {
        let (service, db) = setup_test().await;
        seed_registration(&db, "r1", "may", Some(PledgeType::PayInAdvance), Some("3.00")).await;
        let reconciliation =
            crate::domain::reconciliation_service::ReconciliationService::new(Arc::new(db.clone()));
        reconciliation.set_attendance("r1", true).await.unwrap();
        reconciliation.delete_session("may").await.unwrap();

        let summary = service.finance_summary().await.unwrap();

        assert_eq!(summary.total_money, 3.0);
        assert_eq!(summary.sessions_with_donations, 0);
        assert_eq!(summary.by_session.len(), 1);
        assert_eq!(summary.by_session[0].session_title, UNTITLED_SESSION);
    }

    #[tokio::test]
    async fn test_manual_donation_validation() {
        let (service, _db) = setup_test().await;

        assert!(matches!(
            service.record_manual_donation(money(None, 0.0)).await.unwrap_err(),
            DomainError::Validation(_)
        ));
        let weightless = ManualDonationCommand {
            kind: DonationKind::InKind,
            food_weight_kg: Some(-2.0),
            ..money(None, 1.0)
        };
        assert!(matches!(
            service.record_manual_donation(weightless).await.unwrap_err(),
            DomainError::Validation(_)
        ));
        assert!(matches!(
            service.record_manual_donation(money(Some("missing"), 1.0)).await.unwrap_err(),
            DomainError::NotFound(_)
        ));

        let other = ManualDonationCommand {
            kind: DonationKind::Other,
            amount: None,
            description: Some("  material escolar ".to_string()),
            donation_date: NaiveDate::from_ymd_opt(2025, 3, 1),
            ..money(None, 1.0)
        };
        let donation = service.record_manual_donation(other).await.unwrap();
        assert_eq!(donation.description.as_deref(), Some("material escolar"));
        assert_eq!(donation.registration_id, None);

        let listed = service.list_donations().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, donation.id);
    }

    #[tokio::test]
    async fn test_transparency_report_for_one_year() {
        let (service, _db) = setup_test().await;
        let on = |y, m, d| NaiveDate::from_ymd_opt(y, m, d);
        service
            .record_manual_donation(ManualDonationCommand {
                donation_date: on(2025, 5, 10),
                institution: Some("Lar São Vicente".to_string()),
                ..money(Some("may"), 20.0)
            })
            .await
            .unwrap();
        service
            .record_manual_donation(ManualDonationCommand {
                kind: DonationKind::InKind,
                amount: None,
                food_weight_kg: Some(12.5),
                institution: Some(" lar são vicente ".to_string()),
                donation_date: on(2025, 6, 7),
                ..money(Some("june"), 1.0)
            })
            .await
            .unwrap();
        service
            .record_manual_donation(ManualDonationCommand {
                kind: DonationKind::InKind,
                amount: None,
                food_weight_kg: Some(4.0),
                institution: Some("Banco de Alimentos".to_string()),
                donation_date: on(2024, 11, 2),
                ..money(None, 1.0)
            })
            .await
            .unwrap();

        let report = service.transparency_report(Some(2025)).await.unwrap();
        assert_eq!(report.year, 2025);
        assert_eq!(report.available_years, vec![2025, 2024]);
        assert_eq!(report.total_money, 20.0);
        assert_eq!(report.total_food_kg, 12.5);
        assert_eq!(report.institutions, 1);
        assert_eq!(report.sessions_held, 2);
        assert_eq!(report.donations.len(), 2);
        assert_eq!(report.donations[0].institution.as_deref(), Some("lar são vicente"));

        let older = service.transparency_report(Some(2024)).await.unwrap();
        assert_eq!(older.total_food_kg, 4.0);
        assert_eq!(older.total_money, 0.0);
        assert_eq!(older.sessions_held, 0);

        assert!(matches!(
            service.transparency_report(Some(99)).await.unwrap_err(),
            DomainError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn test_empty_ledger_lists_the_current_year() {
        let (service, _db) = setup_test().await;
        let report = service.transparency_report(None).await.unwrap();

        assert_eq!(report.year, Utc::now().year());
        assert_eq!(report.available_years, vec![Utc::now().year()]);
        assert!(report.donations.is_empty());
        assert_eq!(report.institutions, 0);
    }
}
