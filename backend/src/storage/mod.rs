//! # Storage Module
//!
//! Data persistence for the platform: the storage traits the domain depends
//! on, their SQLite implementation, and object storage for uploaded files.

pub mod files;
pub mod sqlite;
pub mod traits;

pub use files::{FileFolder, FileStorage, OperatorFileStore};
pub use sqlite::DbConnection;
pub use traits::*;
