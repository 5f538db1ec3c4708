pub mod administrator;
pub mod catalog;
pub mod deletion;
pub mod donation;
pub mod registration;
pub mod session;
pub mod statistics;
