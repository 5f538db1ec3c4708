//! # REST API Layer
//!
//! HTTP endpoints of the platform. Each `*_apis` module exposes a `router()`
//! for public routes and/or an `admin_router()` for routes that require an
//! [`AdminSession`](crate::domain::models::administrator::AdminSession).
//!
//! ## Route Map
//!
//! - `/api/sessions`, `/api/subjects`, `/api/statistics`,
//!   `/api/teacher-applications`: public
//! - `/api/admin/...`: administrator only
//! - `/auth/login`: token issuance
//!
//! Handlers convert between the `shared` DTOs and domain types through the
//! mappers and never touch storage directly.

pub mod admin_apis;
pub mod auth;
pub mod auth_apis;
pub mod catalog_apis;
pub mod error;
pub mod finance_apis;
pub mod mappers;
pub mod registration_apis;
pub mod session_apis;
pub mod teacher_application_apis;
pub mod uploads;
