pub mod administrator_repository;
pub mod catalog_repository;
pub mod deletion_repository;
pub mod donation_repository;
pub mod registration_repository;
pub mod session_repository;
pub mod statistics_repository;

pub use administrator_repository::AdministratorRepository;
pub use catalog_repository::CatalogRepository;
pub use deletion_repository::DeletionRepository;
pub use donation_repository::DonationRepository;
pub use registration_repository::{PaymentDetailRepository, RegistrationRepository};
pub use session_repository::SessionRepository;
pub use statistics_repository::StatisticsRepository;
