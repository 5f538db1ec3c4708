//! # REST API for the Donation Ledger

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use shared::{CreateDonationRequest, DonationListResponse, TransparencyQuery};
use tracing::{error, info};

use crate::domain::models::administrator::AdminSession;
use crate::io::rest::mappers::DonationMapper;
use crate::AppState;

/// Public transparency report
pub fn router() -> Router<AppState> {
    Router::new().route("/transparency", get(transparency_report))
}

/// Administrator finance routes
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/finance", get(finance_summary))
        .route("/donations", get(list_donations).post(create_donation))
}

pub async fn transparency_report(
    State(state): State<AppState>,
    Query(query): Query<TransparencyQuery>,
) -> impl IntoResponse {
    info!("GET /api/transparency - year: {:?}", query.year);

    match state.finance_service.transparency_report(query.year).await {
        Ok(report) => (StatusCode::OK, Json(DonationMapper::to_transparency_dto(report))).into_response(),
        Err(e) => {
            error!("Failed to build transparency report: {}", e);
            e.into_response()
        }
    }
}

pub async fn finance_summary(admin: AdminSession, State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/admin/finance by {}", admin.username);

    match state.finance_service.finance_summary().await {
        Ok(summary) => (StatusCode::OK, Json(DonationMapper::to_summary_dto(summary))).into_response(),
        Err(e) => {
            error!("Failed to build finance summary: {}", e);
            e.into_response()
        }
    }
}

pub async fn list_donations(admin: AdminSession, State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/admin/donations by {}", admin.username);

    match state.finance_service.list_donations().await {
        Ok(donations) => {
            let response = DonationListResponse {
                donations: DonationMapper::to_dto_list(donations),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to list donations: {}", e);
            e.into_response()
        }
    }
}

pub async fn create_donation(
    admin: AdminSession,
    State(state): State<AppState>,
    Json(request): Json<CreateDonationRequest>,
) -> impl IntoResponse {
    info!("POST /api/admin/donations by {} - request: {:?}", admin.username, request);

    match state
        .finance_service
        .record_manual_donation(DonationMapper::to_command(request))
        .await
    {
        Ok(donation) => (StatusCode::CREATED, Json(DonationMapper::to_dto(donation))).into_response(),
        Err(e) => {
            error!("Failed to record donation: {}", e);
            e.into_response()
        }
    }
}
