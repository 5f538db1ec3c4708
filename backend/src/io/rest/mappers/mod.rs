pub mod admin_mapper;
pub mod catalog_mapper;
pub mod donation_mapper;
pub mod registration_mapper;
pub mod session_mapper;

pub use admin_mapper::AdminMapper;
pub use catalog_mapper::CatalogMapper;
pub use donation_mapper::DonationMapper;
pub use registration_mapper::RegistrationMapper;
pub use session_mapper::SessionMapper;
