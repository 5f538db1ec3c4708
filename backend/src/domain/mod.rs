//! # Domain Module
//!
//! Business rules of the Aulão Solidário platform, independent of HTTP and
//! of the storage engine.
//!
//! ## Module Organization
//!
//! - **reconciliation_service**: attendance, the donation ledger and the
//!   multi-step deletion of sessions and registrations
//! - **registration_service**: public sign-up and the admin listing
//! - **session_service**: scheduling and class material
//! - **notification_service**: reminder emails to registered students
//! - **finance_service**: ledger summary and manual entries
//! - **teacher_application_service**: volunteer instructor applications
//! - **statistics_service**: yearly counters
//! - **admin_service** / **auth_token**: administrator accounts and tokens
//! - **template**: placeholder rendering for emails
//!
//! ## Business Rules
//!
//! - A monetary pledge becomes exactly one money donation, the first time
//!   the registration is marked as attended
//! - Donations are never deleted by other operations
//! - `attended` implies `confirmed_presence`

pub mod admin_service;
pub mod auth_token;
pub mod catalog_service;
pub mod commands;
pub mod email_service;
pub mod error;
pub mod finance_service;
pub mod models;
pub mod notification_service;
pub mod password;
pub mod reconciliation_service;
pub mod registration_service;
pub mod session_service;
pub mod statistics_service;
pub mod teacher_application_service;
pub mod template;

pub use admin_service::AdminService;
pub use auth_token::AuthTokens;
pub use catalog_service::CatalogService;
pub use error::{DomainError, DomainResult};
pub use finance_service::FinanceService;
pub use notification_service::NotificationService;
pub use reconciliation_service::ReconciliationService;
pub use registration_service::RegistrationService;
pub use session_service::SessionService;
pub use statistics_service::StatisticsService;
pub use teacher_application_service::TeacherApplicationService;
