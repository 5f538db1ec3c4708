//! # IO Module
//!
//! External interfaces of the backend. Currently the REST API only.

pub mod rest;
