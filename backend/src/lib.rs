//! # Aulão Solidário Backend
//!
//! Donation-funded tutoring platform: students register for group review
//! sessions pledging food or money, administrators mark attendance, and
//! attendance of a monetary pledge becomes an entry in the donation ledger.
//!
//! - **domain**: business rules and services
//! - **storage**: SQLite repositories and file storage
//! - **io**: REST API
//! - **config**: file and environment configuration

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use chrono::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use config::AppConfig;
use domain::email_service::{DisabledEmailSender, EmailSender, SmtpEmailSender};
use domain::password::{BcryptPasswordHasher, PasswordHasher};
use domain::{
    AdminService, AuthTokens, CatalogService, FinanceService, NotificationService, ReconciliationService,
    RegistrationService, SessionService, StatisticsService, TeacherApplicationService,
};
use io::rest;
use storage::{DbConnection, FileStorage, OperatorFileStore};

/// Uploaded materials, transcripts and photos
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Shared state handed to every REST handler
#[derive(Clone)]
pub struct AppState {
    pub session_service: SessionService<DbConnection>,
    pub registration_service: RegistrationService<DbConnection>,
    pub reconciliation_service: ReconciliationService<DbConnection>,
    pub notification_service: NotificationService<DbConnection>,
    pub finance_service: FinanceService<DbConnection>,
    pub teacher_application_service: TeacherApplicationService<DbConnection>,
    pub statistics_service: StatisticsService<DbConnection>,
    pub catalog_service: CatalogService<DbConnection>,
    pub admin_service: AdminService<DbConnection>,
    pub auth_tokens: AuthTokens,
}

impl AppState {
    /// Wires every service over one database connection
    pub fn new(
        db: Arc<DbConnection>,
        file_storage: Arc<dyn FileStorage>,
        email_sender: Arc<dyn EmailSender>,
        password_hasher: Arc<dyn PasswordHasher>,
        auth_tokens: AuthTokens,
    ) -> Self {
        let statistics_service = StatisticsService::new(db.clone());
        let session_service = SessionService::new(db.clone(), statistics_service.clone(), file_storage.clone());
        let registration_service = RegistrationService::new(db.clone(), statistics_service.clone());
        let reconciliation_service = ReconciliationService::new(db.clone());
        let notification_service = NotificationService::new(db.clone(), email_sender);
        let finance_service = FinanceService::new(db.clone());
        let teacher_application_service = TeacherApplicationService::new(db.clone(), file_storage);
        let catalog_service = CatalogService::new(db.clone());
        let admin_service = AdminService::new(db, password_hasher, auth_tokens.clone());

        Self {
            session_service,
            registration_service,
            reconciliation_service,
            notification_service,
            finance_service,
            teacher_application_service,
            statistics_service,
            catalog_service,
            admin_service,
            auth_tokens,
        }
    }
}

/// Opens storage, builds the services, seeds the subject catalog and makes
/// sure an administrator exists
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Opening database {}", config.database_url);
    let db = Arc::new(DbConnection::new(&config.database_url).await?);

    let file_storage: Arc<dyn FileStorage> = Arc::new(
        OperatorFileStore::local(&config.upload_dir, &config.public_base_url)
            .with_context(|| format!("failed to open upload directory {}", config.upload_dir))?,
    );

    let email_sender: Arc<dyn EmailSender> = if config.email.is_complete() {
        Arc::new(SmtpEmailSender::new(&config.email)?)
    } else {
        warn!("SMTP settings incomplete, participant notifications are disabled");
        Arc::new(DisabledEmailSender)
    };

    let auth_tokens = AuthTokens::new(&config.jwt_secret, Duration::hours(config.token_ttl_hours));
    let password_hasher = Arc::new(BcryptPasswordHasher::new(config.password_hash_cost));
    let state = AppState::new(db, file_storage, email_sender, password_hasher, auth_tokens);

    state
        .catalog_service
        .ensure_subjects(&config.subjects)
        .await
        .context("failed to seed subjects")?;

    if !config.bootstrap_admin_username.is_empty() && !config.bootstrap_admin_password.is_empty() {
        let created = state
            .admin_service
            .ensure_bootstrap_admin(
                &config.bootstrap_admin_username,
                &config.bootstrap_admin_password,
                "Administrador",
            )
            .await
            .context("failed to create bootstrap administrator")?;
        if created {
            info!("Created bootstrap administrator {}", config.bootstrap_admin_username);
        }
    }

    Ok(state)
}

/// Full application router: API, login, uploaded files and health check
pub fn create_router(app_state: AppState, config: &AppConfig) -> Result<Router> {
    let origin = config
        .allowed_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("invalid allowed origin {}", config.allowed_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let public_routes = Router::new()
        .merge(rest::session_apis::router())
        .merge(rest::registration_apis::router())
        .merge(rest::catalog_apis::router())
        .merge(rest::finance_apis::router())
        .merge(rest::teacher_application_apis::router());

    let admin_routes = Router::new()
        .merge(rest::session_apis::admin_router())
        .merge(rest::registration_apis::admin_router())
        .merge(rest::finance_apis::admin_router())
        .merge(rest::catalog_apis::admin_router())
        .merge(rest::admin_apis::admin_router());

    let router = Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/api", public_routes)
        .nest("/api/admin", admin_routes)
        .nest("/auth", rest::auth_apis::router())
        .nest_service("/files", ServeDir::new(&config.upload_dir))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state);

    Ok(router)
}
