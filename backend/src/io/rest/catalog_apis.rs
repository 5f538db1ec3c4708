//! # REST API for the Public Catalog
//!
//! Subjects, the landing page counters including the all-time food total,
//! and the reminder email template administrators edit.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use shared::{CreateSubjectRequest, EmailTemplate, SubjectListResponse};
use tracing::{error, info};

use crate::domain::models::administrator::AdminSession;
use crate::io::rest::mappers::CatalogMapper;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/subjects", get(list_subjects))
        .route("/statistics", get(get_statistics))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/subjects", post(create_subject))
        .route("/email-template", get(get_email_template).put(save_email_template))
}

pub async fn list_subjects(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/subjects");

    match state.catalog_service.list_subjects().await {
        Ok(subjects) => {
            let response = SubjectListResponse {
                subjects: subjects.into_iter().map(CatalogMapper::subject_to_dto).collect(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to list subjects: {}", e);
            e.into_response()
        }
    }
}

pub async fn get_statistics(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/statistics");

    match state.statistics_service.current().await {
        Ok(statistics) => (StatusCode::OK, Json(CatalogMapper::statistics_to_dto(statistics))).into_response(),
        Err(e) => {
            error!("Failed to load statistics: {}", e);
            e.into_response()
        }
    }
}

pub async fn create_subject(
    admin: AdminSession,
    State(state): State<AppState>,
    Json(request): Json<CreateSubjectRequest>,
) -> impl IntoResponse {
    info!("POST /api/admin/subjects by {} - request: {:?}", admin.username, request);

    match state
        .catalog_service
        .create_subject(CatalogMapper::to_subject_seed(request))
        .await
    {
        Ok(subject) => (StatusCode::CREATED, Json(CatalogMapper::subject_to_dto(subject))).into_response(),
        Err(e) => {
            error!("Failed to create subject: {}", e);
            e.into_response()
        }
    }
}

pub async fn get_email_template(admin: AdminSession, State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/admin/email-template by {}", admin.username);

    match state.notification_service.current_template().await {
        Ok(template) => (StatusCode::OK, Json(CatalogMapper::template_to_dto(template))).into_response(),
        Err(e) => {
            error!("Failed to load email template: {}", e);
            e.into_response()
        }
    }
}

pub async fn save_email_template(
    admin: AdminSession,
    State(state): State<AppState>,
    Json(request): Json<EmailTemplate>,
) -> impl IntoResponse {
    info!("PUT /api/admin/email-template by {}", admin.username);

    match state
        .notification_service
        .save_template(CatalogMapper::template_from_dto(request))
        .await
    {
        Ok(template) => (StatusCode::OK, Json(CatalogMapper::template_to_dto(template))).into_response(),
        Err(e) => {
            error!("Failed to save email template: {}", e);
            e.into_response()
        }
    }
}
