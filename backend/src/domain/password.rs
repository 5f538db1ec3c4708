//! Administrator password hashing.
//!
//! Hashes are bcrypt strings (`$2b$<cost>$<salt+digest>`), so the cost
//! travels with each stored hash and can be raised without a migration.

use anyhow::{Context, Result};

pub use bcrypt::DEFAULT_COST;

pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String>;

    fn verify(&self, password: &str, stored: &str) -> bool;
}

#[derive(Debug, Clone)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    /// `cost` is the bcrypt work factor, between 4 and 31
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}

impl PasswordHasher for BcryptPasswordHasher {
    fn hash(&self, password: &str) -> Result<String> {
        bcrypt::hash(password, self.cost).context("failed to hash password")
    }

    fn verify(&self, password: &str, stored: &str) -> bool {
        bcrypt::verify(password, stored).unwrap_or(false)
    }
}
