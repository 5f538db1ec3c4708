//! Public sign-up for sessions and the administrator registration listing.

use chrono::Utc;
use shared::{PledgeType, RegistrationCounters};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::commands::registration::{
    PledgeFilter, PresenceFilter, RegisterCommand, RegistrationFilter, RegistrationListing,
};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::models::registration::{is_monetary, parse_pledge_amount, PaymentDetail, Registration};
use crate::domain::models::statistics::StatisticField;
use crate::domain::statistics_service::StatisticsService;
use crate::storage::traits::{Connection, PaymentDetailStorage, RegistrationStorage, SessionStorage};

#[derive(Clone)]
pub struct RegistrationService<C: Connection> {
    registration_repository: C::RegistrationRepository,
    payment_detail_repository: C::PaymentDetailRepository,
    session_repository: C::SessionRepository,
    statistics_service: StatisticsService<C>,
}

impl<C: Connection> RegistrationService<C> {
    pub fn new(connection: Arc<C>, statistics_service: StatisticsService<C>) -> Self {
        Self {
            registration_repository: connection.create_registration_repository(),
            payment_detail_repository: connection.create_payment_detail_repository(),
            session_repository: connection.create_session_repository(),
            statistics_service,
        }
    }

    pub async fn register(&self, command: RegisterCommand) -> DomainResult<Registration> {
        info!("Registering a student for session {}", command.session_id);

        let student_name = required(&command.student_name, "Student name")?;
        let student_email = required(&command.student_email, "Student email")?;
        if !student_email.contains('@') {
            return Err(DomainError::validation("Student email must be a valid address"));
        }
        let student_registration_number =
            required(&command.student_registration_number, "Student registration number")?;

        let pledge_amount = command
            .pledge_amount
            .as_deref()
            .map(str::trim)
            .filter(|amount| !amount.is_empty())
            .map(str::to_string);
        let parsed_amount = match (command.pledge_type, pledge_amount.as_deref()) {
            (Some(pledge), Some(raw)) if is_monetary(pledge) => match parse_pledge_amount(Some(raw)) {
                Some(amount) if amount >= 0.0 => Some(amount),
                _ => {
                    return Err(DomainError::validation(format!(
                        "Pledge amount '{}' is not a valid non-negative number",
                        raw
                    )))
                }
            },
            _ => None,
        };

        let session = self
            .session_repository
            .get_session(&command.session_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Session {}", command.session_id)))?;

        let registered = self
            .registration_repository
            .count_registrations_for_session(&session.id)
            .await?;
        if registered >= session.max_participants {
            return Err(DomainError::validation(format!(
                "Session '{}' is full ({} participants)",
                session.title, session.max_participants
            )));
        }

        let now = Utc::now().to_rfc3339();
        let registration = Registration {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: session.id.clone(),
            student_name,
            student_email,
            student_phone: command
                .student_phone
                .as_deref()
                .map(str::trim)
                .filter(|phone| !phone.is_empty())
                .map(str::to_string),
            student_registration_number,
            pledge_type: command.pledge_type,
            pledge_amount,
            confirmed_presence: false,
            attended: false,
            created_at: now.clone(),
            updated_at: now.clone(),
        };
        self.registration_repository.store_registration(&registration).await?;

        if registration.pledge_type == Some(PledgeType::PayInAdvance) {
            let detail = PaymentDetail {
                id: uuid::Uuid::new_v4().to_string(),
                registration_id: registration.id.clone(),
                payment_type: PaymentDetail::ADVANCE_PAYMENT_TYPE.to_string(),
                amount: parsed_amount,
                proof_file_name: command.payment_proof_file_name.clone(),
                payment_date: now.clone(),
                status: PaymentDetail::PENDING_STATUS.to_string(),
                created_at: now,
            };
            if let Err(e) = self.payment_detail_repository.store_payment_detail(&detail).await {
                warn!("Failed to store payment detail for registration {}: {:#}", registration.id, e);
            }
        }

        self.statistics_service
            .increment_quietly(StatisticField::TotalStudents)
            .await;

        info!("Created registration {} for session {}", registration.id, session.id);
        Ok(registration)
    }

    /// Payments recorded for one registration, oldest first
    pub async fn payment_details(&self, registration_id: &str) -> DomainResult<Vec<PaymentDetail>> {
        if self.registration_repository.get_registration(registration_id).await?.is_none() {
            return Err(DomainError::not_found(format!("Registration {}", registration_id)));
        }
        Ok(self.payment_detail_repository.list_payment_details(registration_id).await?)
    }

    pub async fn list_registrations(&self, filter: RegistrationFilter) -> DomainResult<RegistrationListing> {
        let all = self
            .registration_repository
            .list_registrations(filter.session_id.as_deref())
            .await?;
        let counters = count(&all);

        let search = filter
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        let session_titles: HashMap<String, String> = if search.is_some() {
            self.session_repository
                .list_sessions()
                .await?
                .into_iter()
                .map(|session| (session.id, session.title.to_lowercase()))
                .collect()
        } else {
            HashMap::new()
        };

        let registrations = all
            .into_iter()
            .filter(|r| matches_presence(r, filter.presence))
            .filter(|r| matches_pledge(r, filter.pledge))
            .filter(|r| match &search {
                Some(term) => matches_search(r, session_titles.get(&r.session_id), term),
                None => true,
            })
            .collect();

        Ok(RegistrationListing { registrations, counters })
    }
}

fn required(value: &str, field: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn count(registrations: &[Registration]) -> RegistrationCounters {
    let mut counters = RegistrationCounters::default();
    for registration in registrations {
        counters.total += 1;
        if registration.confirmed_presence {
            counters.confirmed += 1;
        }
        if registration.attended {
            counters.attended += 1;
        }
        match registration.pledge_type {
            Some(PledgeType::Food) => counters.food_pledges += 1,
            Some(_) => counters.monetary_pledges += 1,
            None => counters.without_pledge += 1,
        }
    }
    counters
}

fn matches_presence(registration: &Registration, filter: PresenceFilter) -> bool {
    match filter {
        PresenceFilter::All => true,
        PresenceFilter::Confirmed => registration.confirmed_presence,
        PresenceFilter::Pending => !registration.confirmed_presence,
        PresenceFilter::Attended => registration.attended,
    }
}

fn matches_pledge(registration: &Registration, filter: PledgeFilter) -> bool {
    match filter {
        PledgeFilter::All => true,
        PledgeFilter::None => registration.pledge_type.is_none(),
        PledgeFilter::Only(pledge) => registration.pledge_type == Some(pledge),
    }
}

fn matches_search(registration: &Registration, session_title: Option<&String>, term: &str) -> bool {
    registration.student_name.to_lowercase().contains(term)
        || registration.student_email.to_lowercase().contains(term)
        || registration.student_registration_number.to_lowercase().contains(term)
        || session_title.map(|title| title.contains(term)).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sqlite::test_support::{sample_session, seed_registration, seed_session};
    use crate::storage::DbConnection;

    async fn setup_test() -> (RegistrationService<DbConnection>, DbConnection) {
        let db = DbConnection::init_in_memory().await.expect("Failed to create test database");
        seed_session(&db, "s1").await;
        let connection = Arc::new(db.clone());
        let statistics = StatisticsService::new(connection.clone());
        (RegistrationService::new(connection, statistics), db)
    }

    fn command(pledge_type: Option<PledgeType>, pledge_amount: Option<&str>) -> RegisterCommand {
        RegisterCommand {
            session_id: "s1".to_string(),
            student_name: " Ana Souza ".to_string(),
            student_email: "ana@example.com".to_string(),
            student_phone: Some("".to_string()),
            student_registration_number: "2025001".to_string(),
            pledge_type,
            pledge_amount: pledge_amount.map(str::to_string),
            payment_proof_file_name: Some("comprovante.pdf".to_string()),
        }
    }

    #[tokio::test]
    async fn test_register_stores_registration_and_counts_student() {
        let (service, db) = setup_test().await;

        let registration = service.register(command(Some(PledgeType::Food), None)).await.unwrap();

        assert_eq!(registration.student_name, "Ana Souza");
        assert_eq!(registration.student_phone, None);
        assert!(!registration.confirmed_presence && !registration.attended);
        let stored = db.create_registration_repository().get_registration(&registration.id).await.unwrap();
        assert_eq!(stored, Some(registration));

        let statistics = StatisticsService::new(Arc::new(db)).current().await.unwrap();
        assert_eq!(statistics.total_students, 1);
    }

    #[tokio::test]
    async fn test_advance_payment_creates_payment_detail() {
        let (service, _db) = setup_test().await;

        let registration = service
            .register(command(Some(PledgeType::PayInAdvance), Some("3.00")))
            .await
            .unwrap();

        let details = service.payment_details(&registration.id).await.unwrap();
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].payment_type, PaymentDetail::ADVANCE_PAYMENT_TYPE);
        assert_eq!(details[0].amount, Some(3.0));
        assert_eq!(details[0].proof_file_name.as_deref(), Some("comprovante.pdf"));
        assert_eq!(details[0].status, "pending");

        let at_event = service
            .register(command(Some(PledgeType::PayAtEvent), Some("3.00")))
            .await
            .unwrap();
        assert!(service.payment_details(&at_event.id).await.unwrap().is_empty());
        assert!(matches!(
            service.payment_details("missing").await.unwrap_err(),
            DomainError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_register_validation() {
        let (service, _db) = setup_test().await;

        let mut missing_name = command(None, None);
        missing_name.student_name = "  ".to_string();
        let mut bad_email = command(None, None);
        bad_email.student_email = "ana.example.com".to_string();
        let bad_amount = command(Some(PledgeType::PayAtEvent), Some("dez"));
        let negative_amount = command(Some(PledgeType::PayAtEvent), Some("-1"));

        for invalid in [missing_name, bad_email, bad_amount, negative_amount] {
            let error = service.register(invalid).await.unwrap_err();
            assert!(matches!(error, DomainError::Validation(_)), "got {:?}", error);
        }

        let mut unknown_session = command(None, None);
        unknown_session.session_id = "missing".to_string();
        assert!(matches!(
            service.register(unknown_session).await.unwrap_err(),
            DomainError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_full_session_rejects_registration() {
        let (service, db) = setup_test().await;
        let mut small = sample_session("small");
        small.max_participants = 1;
        db.create_session_repository().store_session(&small).await.unwrap();

        let mut first = command(None, None);
        first.session_id = "small".to_string();
        service.register(first.clone()).await.unwrap();

        let error = service.register(first).await.unwrap_err();
        assert!(matches!(error, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_listing_filters_and_counters() {
        let (service, db) = setup_test().await;
        seed_session(&db, "s2").await;
        let attended = seed_registration(&db, "r1", "s1", Some(PledgeType::PayAtEvent), Some("5")).await;
        db.create_registration_repository()
            .update_attendance(&attended.id, true, "2025-05-10T18:00:00+00:00")
            .await
            .unwrap();
        seed_registration(&db, "r2", "s1", Some(PledgeType::Food), None).await;
        seed_registration(&db, "r3", "s1", None, None).await;
        seed_registration(&db, "r4", "s2", None, None).await;

        let listing = service
            .list_registrations(RegistrationFilter {
                session_id: Some("s1".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(listing.registrations.len(), 3);
        assert_eq!(
            listing.counters,
            RegistrationCounters {
                total: 3,
                confirmed: 1,
                attended: 1,
                food_pledges: 1,
                monetary_pledges: 1,
                without_pledge: 1,
            }
        );

        let attended_only = service
            .list_registrations(RegistrationFilter {
                session_id: Some("s1".to_string()),
                presence: PresenceFilter::Attended,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(attended_only.registrations.len(), 1);
        assert_eq!(attended_only.registrations[0].id, "r1");
        // Counters ignore the filters
        assert_eq!(attended_only.counters.total, 3);

        let no_pledge = service
            .list_registrations(RegistrationFilter {
                pledge: PledgeFilter::None,
                ..Default::default()
            })
            .await
            .unwrap();
        let mut ids: Vec<_> = no_pledge.registrations.iter().map(|r| r.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["r3", "r4"]);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_covers_session_title() {
        let (service, db) = setup_test().await;
        let mut other = sample_session("s2");
        other.title = "Física Básica".to_string();
        db.create_session_repository().store_session(&other).await.unwrap();
        seed_registration(&db, "r1", "s1", None, None).await;
        seed_registration(&db, "r2", "s2", None, None).await;

        let by_title = service
            .list_registrations(RegistrationFilter {
                search: Some("FÍSICA".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_title.registrations.len(), 1);
        assert_eq!(by_title.registrations[0].id, "r2");

        let by_email = service
            .list_registrations(RegistrationFilter {
                search: Some("R1@EXAMPLE".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_email.registrations.len(), 1);
        assert_eq!(by_email.registrations[0].id, "r1");
    }
}
