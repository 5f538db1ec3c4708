use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row};

use crate::domain::models::administrator::Administrator;
use crate::storage::sqlite::connection::DbConnection;
use crate::storage::traits::AdministratorStorage;

const ADMINISTRATOR_COLUMNS: &str =
    "id, username, full_name, email, password_hash, created_at, updated_at";

#[derive(Clone)]
pub struct AdministratorRepository {
    db: DbConnection,
}

impl AdministratorRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn row_to_administrator(row: &SqliteRow) -> Result<Administrator> {
        Ok(Administrator {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            full_name: row.try_get("full_name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl AdministratorStorage for AdministratorRepository {
    async fn store_administrator(&self, administrator: &Administrator) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO administrators ({}) VALUES (?, ?, ?, ?, ?, ?, ?)",
            ADMINISTRATOR_COLUMNS
        ))
        .bind(&administrator.id)
        .bind(&administrator.username)
        .bind(&administrator.full_name)
        .bind(&administrator.email)
        .bind(&administrator.password_hash)
        .bind(&administrator.created_at)
        .bind(&administrator.updated_at)
        .execute(self.db.pool())
        .await
        .context("failed to insert administrator")?;
        Ok(())
    }

    async fn get_administrator(&self, admin_id: &str) -> Result<Option<Administrator>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM administrators WHERE id = ?",
            ADMINISTRATOR_COLUMNS
        ))
        .bind(admin_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::row_to_administrator).transpose()
    }

    async fn get_administrator_by_username(&self, username: &str) -> Result<Option<Administrator>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM administrators WHERE username = ?",
            ADMINISTRATOR_COLUMNS
        ))
        .bind(username)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::row_to_administrator).transpose()
    }

    async fn list_administrators(&self) -> Result<Vec<Administrator>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM administrators ORDER BY created_at ASC, username ASC",
            ADMINISTRATOR_COLUMNS
        ))
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::row_to_administrator).collect()
    }

    async fn update_administrator(&self, administrator: &Administrator) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE administrators
            SET username = ?, full_name = ?, email = ?, password_hash = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&administrator.username)
        .bind(&administrator.full_name)
        .bind(&administrator.email)
        .bind(&administrator.password_hash)
        .bind(&administrator.updated_at)
        .bind(&administrator.id)
        .execute(self.db.pool())
        .await
        .context("failed to update administrator")?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_administrator(&self, admin_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM administrators WHERE id = ?")
            .bind(admin_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_administrators(&self) -> Result<u32> {
        let count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM administrators")
            .fetch_one(self.db.pool())
            .await?
            .get("n");
        Ok(count as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin(id: &str, username: &str) -> Administrator {
        Administrator {
            id: id.to_string(),
            username: username.to_string(),
            full_name: format!("Admin {}", username),
            email: None,
            password_hash: "salt$hash".to_string(),
            created_at: format!("2025-01-0{}T00:00:00+00:00", id.len()),
            updated_at: "2025-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[tokio::test]
    async fn test_usernames_are_unique() {
        let db = DbConnection::init_in_memory().await.unwrap();
        let repo = AdministratorRepository::new(db);

        repo.store_administrator(&admin("a1", "maria")).await.unwrap();
        assert!(repo.store_administrator(&admin("a2", "maria")).await.is_err());
        assert_eq!(repo.count_administrators().await.unwrap(), 1);
        assert_eq!(
            repo.get_administrator_by_username("maria").await.unwrap().unwrap().id,
            "a1"
        );
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = DbConnection::init_in_memory().await.unwrap();
        let repo = AdministratorRepository::new(db);
        let mut record = admin("a1", "joao");
        repo.store_administrator(&record).await.unwrap();

        record.full_name = "João Silva".to_string();
        assert!(repo.update_administrator(&record).await.unwrap());
        assert_eq!(repo.get_administrator("a1").await.unwrap().unwrap().full_name, "João Silva");

        assert!(repo.delete_administrator("a1").await.unwrap());
        assert!(repo.list_administrators().await.unwrap().is_empty());
    }
}
