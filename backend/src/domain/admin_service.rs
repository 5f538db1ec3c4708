//! Administrator accounts and login.
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::auth_token::AuthTokens;
use crate::domain::commands::administrator::{
    CreateAdministratorCommand, LoginResult, UpdateAdministratorCommand,
};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::models::administrator::{AdminSession, Administrator};
use crate::domain::password::PasswordHasher;
use crate::storage::traits::{AdministratorStorage, Connection};

const INVALID_CREDENTIALS: &str = "Invalid username or password";

#[derive(Clone)]
pub struct AdminService<C: Connection> {
    administrator_repository: C::AdministratorRepository,
    password_hasher: Arc<dyn PasswordHasher>,
    tokens: AuthTokens,
}

impl<C: Connection> AdminService<C> {
    pub fn new(connection: Arc<C>, password_hasher: Arc<dyn PasswordHasher>, tokens: AuthTokens) -> Self {
        Self {
            administrator_repository: connection.create_administrator_repository(),
            password_hasher,
            tokens,
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> DomainResult<LoginResult> {
        let candidate = self
            .administrator_repository
            .get_administrator_by_username(username.trim())
            .await?;
        let verified = match &candidate {
            Some(administrator) => self.verify_password(password, &administrator.password_hash).await,
            None => false,
        };
        let administrator = match candidate {
            Some(administrator) if verified => administrator,
            _ => {
                warn!("Failed login attempt for '{}'", username);
                return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.to_string()));
            }
        };

        let token = self.tokens.issue(&AdminSession {
            admin_id: administrator.id.clone(),
            username: administrator.username.clone(),
        })?;
        info!("Administrator '{}' logged in", administrator.username);
        Ok(LoginResult { token, administrator })
    }

    /// Checks that the account behind a verified token still exists.
    /// The returned session carries the current username.
    pub async fn authorize(&self, session: AdminSession) -> DomainResult<AdminSession> {
        match self.administrator_repository.get_administrator(&session.admin_id).await? {
            Some(administrator) => Ok(AdminSession {
                admin_id: administrator.id,
                username: administrator.username,
            }),
            None => {
                warn!("Rejected token of removed administrator '{}'", session.username);
                Err(DomainError::Unauthorized("Administrator account no longer exists".to_string()))
            }
        }
    }

    pub async fn list_administrators(&self) -> DomainResult<Vec<Administrator>> {
        Ok(self.administrator_repository.list_administrators().await?)
    }

    pub async fn create_administrator(&self, command: CreateAdministratorCommand) -> DomainResult<Administrator> {
        let username = required(&command.username, "Username")?;
        let full_name = required(&command.full_name, "Full name")?;
        if command.password.is_empty() {
            return Err(DomainError::validation("Password is required"));
        }
        self.ensure_username_free(&username, None).await?;

        let now = Utc::now().to_rfc3339();
        let administrator = Administrator {
            id: uuid::Uuid::new_v4().to_string(),
            username,
            full_name,
            email: optional(command.email),
            password_hash: self.hash_password(command.password).await?,
            created_at: now.clone(),
            updated_at: now,
        };
        self.administrator_repository.store_administrator(&administrator).await?;

        info!("Created administrator '{}'", administrator.username);
        Ok(administrator)
    }

    /// The password is only replaced when a non-empty one is given
    pub async fn update_administrator(&self, command: UpdateAdministratorCommand) -> DomainResult<Administrator> {
        let mut administrator = self
            .administrator_repository
            .get_administrator(&command.admin_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Administrator {}", command.admin_id)))?;

        let username = required(&command.username, "Username")?;
        if username != administrator.username {
            self.ensure_username_free(&username, Some(&administrator.id)).await?;
        }

        administrator.username = username;
        administrator.full_name = required(&command.full_name, "Full name")?;
        administrator.email = optional(command.email);
        if let Some(password) = command.password.filter(|p| !p.is_empty()) {
            administrator.password_hash = self.hash_password(password).await?;
        }
        administrator.updated_at = Utc::now().to_rfc3339();

        if !self.administrator_repository.update_administrator(&administrator).await? {
            return Err(DomainError::not_found(format!("Administrator {}", command.admin_id)));
        }
        info!("Updated administrator '{}'", administrator.username);
        Ok(administrator)
    }

    pub async fn delete_administrator(&self, acting: &AdminSession, admin_id: &str) -> DomainResult<()> {
        if acting.admin_id == admin_id {
            return Err(DomainError::validation("You cannot delete your own account"));
        }
        if !self.administrator_repository.delete_administrator(admin_id).await? {
            return Err(DomainError::not_found(format!("Administrator {}", admin_id)));
        }
        info!("Administrator '{}' deleted administrator {}", acting.username, admin_id);
        Ok(())
    }

    /// Creates the configured first account when there is none.
    /// Returns true when an account was created.
    pub async fn ensure_bootstrap_admin(&self, username: &str, password: &str, full_name: &str) -> DomainResult<bool> {
        if self.administrator_repository.count_administrators().await? > 0 {
            return Ok(false);
        }
        if username.trim().is_empty() || password.is_empty() {
            warn!("No administrators exist and no bootstrap credentials are configured");
            return Ok(false);
        }

        self.create_administrator(CreateAdministratorCommand {
            username: username.to_string(),
            full_name: full_name.to_string(),
            email: None,
            password: password.to_string(),
        })
        .await?;
        info!("Created bootstrap administrator '{}'", username.trim());
        Ok(true)
    }

    // Hashing runs on the blocking pool
    async fn hash_password(&self, password: String) -> DomainResult<String> {
        let hasher = self.password_hasher.clone();
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .context("password hashing task failed")??;
        Ok(hash)
    }

    async fn verify_password(&self, password: &str, stored: &str) -> bool {
        let hasher = self.password_hasher.clone();
        let (password, stored) = (password.to_string(), stored.to_string());
        tokio::task::spawn_blocking(move || hasher.verify(&password, &stored))
            .await
            .unwrap_or(false)
    }

    async fn ensure_username_free(&self, username: &str, allowed_owner: Option<&str>) -> DomainResult<()> {
        match self.administrator_repository.get_administrator_by_username(username).await? {
            Some(existing) if Some(existing.id.as_str()) != allowed_owner => Err(DomainError::validation(
                format!("Username '{}' is already taken", username),
            )),
            _ => Ok(()),
        }
    }
}

fn required(value: &str, field: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
