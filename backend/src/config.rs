//! Runtime configuration.
//!
//! Values come from an optional TOML file (`AULAO_CONFIG`, default
//! `aulao.toml`) and are then overridden by `AULAO_*` environment variables.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::domain::commands::catalog::SubjectSeed;
use crate::domain::email_service::EmailConfig;
use crate::domain::password::DEFAULT_COST;

pub const CONFIG_PATH_ENV: &str = "AULAO_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "aulao.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    /// Local directory backing uploaded files
    pub upload_dir: String,
    /// Prefix of the URLs handed out for uploaded files
    pub public_base_url: String,
    pub allowed_origin: String,
    pub bootstrap_admin_username: String,
    pub bootstrap_admin_password: String,
    /// bcrypt work factor for administrator passwords
    pub password_hash_cost: u32,
    pub email: EmailConfig,
    /// Catalog entries created at startup when missing (`[[subjects]]`)
    pub subjects: Vec<SubjectSeed>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            database_url: "sqlite://aulao.db".to_string(),
            jwt_secret: String::new(),
            token_ttl_hours: 12,
            upload_dir: "uploads".to_string(),
            public_base_url: "http://localhost:3000/files".to_string(),
            allowed_origin: "http://localhost:5173".to_string(),
            bootstrap_admin_username: String::new(),
            bootstrap_admin_password: String::new(),
            password_hash_cost: DEFAULT_COST,
            email: EmailConfig::default(),
            subjects: default_subjects(),
        }
    }
}

fn default_subjects() -> Vec<SubjectSeed> {
    vec![
        SubjectSeed::new("calculo-1", "Cálculo I"),
        SubjectSeed::new("calculo-2", "Cálculo II"),
        SubjectSeed::new("algebra-linear", "Álgebra Linear"),
        SubjectSeed::new("fisica-1", "Física I"),
        SubjectSeed::new("quimica-geral", "Química Geral"),
    ]
}

impl AppConfig {
    /// Load from the configured file and the process environment
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::from_sources(Path::new(&path), |key| std::env::var(key).ok())
    }

    pub fn from_sources(path: &Path, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = if path.exists() {
            info!("Loading configuration from {:?}", path);
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content).with_context(|| format!("Failed to parse config TOML {:?}", path))?
        } else {
            info!("No config file at {:?}, using defaults and environment", path);
            AppConfig::default()
        };

        config.apply_overrides(env)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<()> {
        let set = |key: &str, target: &mut String| {
            if let Some(value) = env(key) {
                *target = value;
            }
        };
        set("AULAO_BIND_ADDR", &mut self.bind_addr);
        set("AULAO_DATABASE_URL", &mut self.database_url);
        set("AULAO_JWT_SECRET", &mut self.jwt_secret);
        set("AULAO_UPLOAD_DIR", &mut self.upload_dir);
        set("AULAO_PUBLIC_BASE_URL", &mut self.public_base_url);
        set("AULAO_ALLOWED_ORIGIN", &mut self.allowed_origin);
        set("AULAO_ADMIN_USERNAME", &mut self.bootstrap_admin_username);
        set("AULAO_ADMIN_PASSWORD", &mut self.bootstrap_admin_password);
        set("AULAO_SMTP_SERVER", &mut self.email.smtp_server);
        set("AULAO_SMTP_USERNAME", &mut self.email.username);
        set("AULAO_SMTP_PASSWORD", &mut self.email.password);
        set("AULAO_SMTP_FROM_EMAIL", &mut self.email.from_email);
        set("AULAO_SMTP_FROM_NAME", &mut self.email.from_name);

        if let Some(port) = env("AULAO_SMTP_PORT") {
            self.email.smtp_port = port
                .trim()
                .parse()
                .with_context(|| format!("AULAO_SMTP_PORT is not a port number: {}", port))?;
        }
        if let Some(hours) = env("AULAO_TOKEN_TTL_HOURS") {
            self.token_ttl_hours = hours
                .trim()
                .parse()
                .with_context(|| format!("AULAO_TOKEN_TTL_HOURS is not a number: {}", hours))?;
        }
        if let Some(cost) = env("AULAO_PASSWORD_HASH_COST") {
            self.password_hash_cost = cost
                .trim()
                .parse()
                .with_context(|| format!("AULAO_PASSWORD_HASH_COST is not a number: {}", cost))?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.jwt_secret.trim().is_empty() {
            return Err(anyhow!("A JWT secret is required (jwt_secret or AULAO_JWT_SECRET)"));
        }
        if self.token_ttl_hours <= 0 {
            return Err(anyhow!("token_ttl_hours must be positive"));
        }
        if self.database_url.trim().is_empty() {
            return Err(anyhow!("database_url must not be empty"));
        }
        if !(4..=31).contains(&self.password_hash_cost) {
            return Err(anyhow!("password_hash_cost must be between 4 and 31"));
        }
        if self.subjects.iter().any(|s| s.name.trim().is_empty()) {
            return Err(anyhow!("every [[subjects]] entry needs a name"));
        }
        Ok(())
    }
}
