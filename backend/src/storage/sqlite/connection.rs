use anyhow::{Context, Result};
use sqlx::{
    migrate::MigrateDatabase,
    sqlite::SqlitePoolOptions,
    Sqlite, SqlitePool,
};
use std::sync::Arc;
use tracing::info;

use crate::storage::sqlite::repositories::{
    AdministratorRepository, CatalogRepository, DeletionRepository, DonationRepository,
    PaymentDetailRepository, RegistrationRepository, SessionRepository, StatisticsRepository,
};
use crate::storage::traits::Connection;

/// DbConnection manages the SQLite pool and schema
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Open (and create if missing) the database at `url`
    pub async fn new(url: &str) -> Result<Self> {
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            info!("Creating database {}", url);
            Sqlite::create_database(url)
                .await
                .with_context(|| format!("failed to create database {}", url))?;
        }

        let pool = SqlitePool::connect(url)
            .await
            .with_context(|| format!("failed to connect to {}", url))?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Private in-memory database with a unique name.
    ///
    /// A single pooled connection that never expires keeps the memory
    /// database alive for as long as the connection value exists.
    pub async fn init_in_memory() -> Result<Self> {
        let db_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", db_id);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect(&db_url)
            .await
            .context("failed to open in-memory database")?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS subjects (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT,
                is_scheduled BOOLEAN NOT NULL DEFAULT FALSE,
                is_seeking_teachers BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS volunteer_teachers (
                id TEXT PRIMARY KEY,
                full_name TEXT NOT NULL,
                email TEXT NOT NULL,
                phone TEXT,
                university TEXT,
                course TEXT,
                availability TEXT,
                subjects_can_teach TEXT NOT NULL DEFAULT '[]',
                motivation TEXT,
                registration_number TEXT NOT NULL,
                photo_url TEXT,
                academic_history_url TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                approved BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS scheduled_sessions (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                subject_id TEXT NOT NULL,
                teacher_id TEXT,
                date TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                location TEXT NOT NULL,
                max_participants INTEGER NOT NULL DEFAULT 50,
                topics TEXT NOT NULL DEFAULT '[]',
                materials_needed TEXT,
                status TEXT NOT NULL DEFAULT 'agendado',
                file_url TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_scheduled_sessions_date
            ON scheduled_sessions(date, start_time);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS registrations (
                id TEXT PRIMARY KEY,
                session_id TEXT NOT NULL,
                student_name TEXT NOT NULL,
                student_email TEXT NOT NULL,
                student_phone TEXT,
                student_registration_number TEXT NOT NULL,
                pledge_type TEXT,
                pledge_amount TEXT,
                confirmed_presence BOOLEAN NOT NULL DEFAULT FALSE,
                attended BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (session_id) REFERENCES scheduled_sessions (id)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_registrations_session_id
            ON registrations(session_id);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS payment_details (
                id TEXT PRIMARY KEY,
                registration_id TEXT NOT NULL,
                payment_type TEXT NOT NULL,
                amount REAL,
                proof_file_name TEXT,
                payment_date TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                created_at TEXT NOT NULL,
                FOREIGN KEY (registration_id) REFERENCES registrations (id)
            );
            "#,
        )
        .execute(pool)
        .await?;

        // No foreign keys here: ledger rows outlive their registration and session
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS donations (
                id TEXT PRIMARY KEY,
                session_id TEXT,
                registration_id TEXT,
                kind TEXT NOT NULL,
                amount REAL,
                food_weight_kg REAL,
                description TEXT,
                institution TEXT,
                donation_date TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        // At most one money entry per registration
        sqlx::query(
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_donations_money_per_registration
            ON donations(registration_id)
            WHERE kind = 'dinheiro' AND registration_id IS NOT NULL;
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_donations_session_id
            ON donations(session_id);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS email_templates (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                subject TEXT NOT NULL,
                body TEXT NOT NULL,
                signature TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS platform_statistics (
                year INTEGER PRIMARY KEY,
                total_classes INTEGER NOT NULL DEFAULT 0,
                total_students INTEGER NOT NULL DEFAULT 0,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS administrators (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                full_name TEXT NOT NULL,
                email TEXT,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS session_deletions (
                session_id TEXT PRIMARY KEY,
                registration_ids TEXT NOT NULL DEFAULT '[]',
                completed_step TEXT,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

impl Connection for DbConnection {
    type RegistrationRepository = RegistrationRepository;
    type PaymentDetailRepository = PaymentDetailRepository;
    type DonationRepository = DonationRepository;
    type SessionRepository = SessionRepository;
    type CatalogRepository = CatalogRepository;
    type StatisticsRepository = StatisticsRepository;
    type AdministratorRepository = AdministratorRepository;
    type DeletionRepository = DeletionRepository;

    fn create_registration_repository(&self) -> Self::RegistrationRepository {
        RegistrationRepository::new(self.clone())
    }

    fn create_payment_detail_repository(&self) -> Self::PaymentDetailRepository {
        PaymentDetailRepository::new(self.clone())
    }

    fn create_donation_repository(&self) -> Self::DonationRepository {
        DonationRepository::new(self.clone())
    }

    fn create_session_repository(&self) -> Self::SessionRepository {
        SessionRepository::new(self.clone())
    }

    fn create_catalog_repository(&self) -> Self::CatalogRepository {
        CatalogRepository::new(self.clone())
    }

    fn create_statistics_repository(&self) -> Self::StatisticsRepository {
        StatisticsRepository::new(self.clone())
    }

    fn create_administrator_repository(&self) -> Self::AdministratorRepository {
        AdministratorRepository::new(self.clone())
    }

    fn create_deletion_repository(&self) -> Self::DeletionRepository {
        DeletionRepository::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Row;

    #[tokio::test]
    async fn test_schema_is_created_in_memory() {
        let db = DbConnection::init_in_memory().await.expect("Failed to create test database");

        let rows = sqlx::query("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .fetch_all(db.pool())
            .await
            .unwrap();
        let tables: Vec<String> = rows.iter().map(|row| row.get("name")).collect();

        for expected in [
            "administrators",
            "donations",
            "payment_details",
            "registrations",
            "scheduled_sessions",
            "session_deletions",
        ] {
            assert!(tables.iter().any(|t| t == expected), "missing table {}", expected);
        }
    }

    #[tokio::test]
    async fn test_databases_are_isolated() {
        let first = DbConnection::init_in_memory().await.unwrap();
        let second = DbConnection::init_in_memory().await.unwrap();

        sqlx::query("INSERT INTO platform_statistics (year, updated_at) VALUES (2025, 'now')")
            .execute(first.pool())
            .await
            .unwrap();

        let count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM platform_statistics")
            .fetch_one(second.pool())
            .await
            .unwrap()
            .get("n");
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_file_database_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}", dir.path().join("aulao.db").display());

        let db = DbConnection::new(&url).await.unwrap();
        assert!(dir.path().join("aulao.db").exists());
        drop(db);

        // Reopening runs the idempotent schema setup again
        DbConnection::new(&url).await.unwrap();
    }
}
