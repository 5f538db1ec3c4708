//! # SQLite Storage Module
//!
//! SQLite implementations of the storage traits.
//!
//! - **connection.rs** - pool management, schema setup and the `Connection` factory
//! - **repositories/** - one repository per aggregate

pub mod connection;
pub mod repositories;

#[cfg(test)]
pub(crate) mod test_support;

pub use connection::DbConnection;
pub use repositories::{
    AdministratorRepository, CatalogRepository, DeletionRepository, DonationRepository,
    PaymentDetailRepository, RegistrationRepository, SessionRepository, StatisticsRepository,
};
