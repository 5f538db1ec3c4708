//! # Storage Traits
//!
//! Storage abstractions used by the domain services. Every adapter method
//! returns `anyhow::Result`; services translate failures into
//! `DomainError::Storage`.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::{
    administrator::Administrator,
    catalog::{EmailTemplate, Subject, VolunteerTeacher},
    deletion::SessionDeletion,
    donation::Donation,
    registration::{PaymentDetail, Registration},
    session::ScheduledSession,
    statistics::{PlatformStatistics, StatisticField},
};

#[async_trait]
pub trait RegistrationStorage: Send + Sync {
    async fn store_registration(&self, registration: &Registration) -> Result<()>;

    async fn get_registration(&self, registration_id: &str) -> Result<Option<Registration>>;

    /// Newest first, optionally restricted to one session
    async fn list_registrations(&self, session_id: Option<&str>) -> Result<Vec<Registration>>;

    async fn list_registration_ids_for_session(&self, session_id: &str) -> Result<Vec<String>>;

    async fn count_registrations_for_session(&self, session_id: &str) -> Result<u32>;

    /// Sets `attended` and `confirmed_presence` to the same value.
    /// Returns false when the registration does not exist.
    async fn update_attendance(&self, registration_id: &str, attended: bool, updated_at: &str) -> Result<bool>;

    /// Returns false when the registration does not exist
    async fn update_confirmed_presence(&self, registration_id: &str, confirmed: bool, updated_at: &str) -> Result<bool>;

    async fn delete_registration(&self, registration_id: &str) -> Result<bool>;

    /// Returns the number of deleted rows
    async fn delete_registrations_for_session(&self, session_id: &str) -> Result<u32>;
}

#[async_trait]
pub trait PaymentDetailStorage: Send + Sync {
    async fn store_payment_detail(&self, detail: &PaymentDetail) -> Result<()>;

    async fn list_payment_details(&self, registration_id: &str) -> Result<Vec<PaymentDetail>>;

    /// Returns the number of deleted rows
    async fn delete_payment_details_for_registrations(&self, registration_ids: &[String]) -> Result<u32>;
}

#[async_trait]
pub trait DonationStorage: Send + Sync {
    /// Plain insert, used for manual ledger entries
    async fn store_donation(&self, donation: &Donation) -> Result<()>;

    /// Inserts a money donation unless one already exists for the same
    /// registration. The check happens inside the database, so concurrent
    /// callers cannot both insert. Returns true when a row was written.
    async fn insert_money_donation_if_absent(&self, donation: &Donation) -> Result<bool>;

    async fn find_money_donation_for_registration(&self, registration_id: &str) -> Result<Option<Donation>>;

    /// Every entry, most recent donation date first
    async fn list_donations(&self) -> Result<Vec<Donation>>;

    /// Money entries with a positive amount
    async fn list_money_donations(&self) -> Result<Vec<Donation>>;

    /// Sum of every positive food weight ever recorded
    async fn total_food_weight_kg(&self) -> Result<f64>;

    /// Sets `session_id` to NULL on every entry of the session.
    /// Returns the number of updated rows.
    async fn unlink_session(&self, session_id: &str) -> Result<u32>;
}

#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn store_session(&self, session: &ScheduledSession) -> Result<()>;

    async fn get_session(&self, session_id: &str) -> Result<Option<ScheduledSession>>;

    /// Date ascending, then start time ascending
    async fn list_sessions(&self) -> Result<Vec<ScheduledSession>>;

    async fn update_session(&self, session: &ScheduledSession) -> Result<bool>;

    async fn set_file_url(&self, session_id: &str, file_url: &str, updated_at: &str) -> Result<bool>;

    async fn delete_session(&self, session_id: &str) -> Result<bool>;
}

/// Read side of subjects, instructors and email templates
#[async_trait]
pub trait CatalogStorage: Send + Sync {
    async fn store_subject(&self, subject: &Subject) -> Result<()>;

    /// Ordered by name
    async fn list_subjects(&self) -> Result<Vec<Subject>>;

    async fn get_subject(&self, subject_id: &str) -> Result<Option<Subject>>;

    async fn store_teacher(&self, teacher: &VolunteerTeacher) -> Result<()>;

    async fn get_teacher(&self, teacher_id: &str) -> Result<Option<VolunteerTeacher>>;

    async fn store_email_template(&self, template: &EmailTemplate) -> Result<()>;

    /// Most recently created template, if any
    async fn latest_email_template(&self) -> Result<Option<EmailTemplate>>;
}

#[async_trait]
pub trait StatisticsStorage: Send + Sync {
    /// Adds one to `field` for `year`, creating the row when needed
    async fn increment(&self, year: i32, field: StatisticField, updated_at: &str) -> Result<()>;

    async fn get_statistics(&self, year: i32) -> Result<Option<PlatformStatistics>>;
}

#[async_trait]
pub trait AdministratorStorage: Send + Sync {
    async fn store_administrator(&self, administrator: &Administrator) -> Result<()>;

    async fn get_administrator(&self, admin_id: &str) -> Result<Option<Administrator>>;

    async fn get_administrator_by_username(&self, username: &str) -> Result<Option<Administrator>>;

    /// Ordered by creation time
    async fn list_administrators(&self) -> Result<Vec<Administrator>>;

    async fn update_administrator(&self, administrator: &Administrator) -> Result<bool>;

    async fn delete_administrator(&self, admin_id: &str) -> Result<bool>;

    async fn count_administrators(&self) -> Result<u32>;
}

/// Progress records of multi-step session deletions
#[async_trait]
pub trait DeletionStorage: Send + Sync {
    async fn get_session_deletion(&self, session_id: &str) -> Result<Option<SessionDeletion>>;

    /// Insert or replace the record for `deletion.session_id`
    async fn save_session_deletion(&self, deletion: &SessionDeletion) -> Result<()>;

    async fn clear_session_deletion(&self, session_id: &str) -> Result<()>;
}

/// Trait defining the interface for storage connections
///
/// Factory for the repositories a service needs, so services can be built
/// against any backend (or a test double wrapping one).
pub trait Connection: Send + Sync + Clone + 'static {
    type RegistrationRepository: RegistrationStorage + Clone;
    type PaymentDetailRepository: PaymentDetailStorage + Clone;
    type DonationRepository: DonationStorage + Clone;
    type SessionRepository: SessionStorage + Clone;
    type CatalogRepository: CatalogStorage + Clone;
    type StatisticsRepository: StatisticsStorage + Clone;
    type AdministratorRepository: AdministratorStorage + Clone;
    type DeletionRepository: DeletionStorage + Clone;

    fn create_registration_repository(&self) -> Self::RegistrationRepository;
    fn create_payment_detail_repository(&self) -> Self::PaymentDetailRepository;
    fn create_donation_repository(&self) -> Self::DonationRepository;
    fn create_session_repository(&self) -> Self::SessionRepository;
    fn create_catalog_repository(&self) -> Self::CatalogRepository;
    fn create_statistics_repository(&self) -> Self::StatisticsRepository;
    fn create_administrator_repository(&self) -> Self::AdministratorRepository;
    fn create_deletion_repository(&self) -> Self::DeletionRepository;
}
