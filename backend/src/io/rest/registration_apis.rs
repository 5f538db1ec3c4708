//! # REST API for Registrations
//!
//! Public sign-up, and the administrator endpoints for listing, attendance,
//! presence confirmation and deletion.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, post, put},
    Router,
};
use shared::{
    ConfirmPresenceRequest, CreateRegistrationRequest, PaymentDetailListResponse, RegistrationListQuery,
    RegistrationListResponse, RegistrationResponse, SetAttendanceRequest,
};
use tracing::{error, info};

use crate::domain::models::administrator::AdminSession;
use crate::io::rest::mappers::RegistrationMapper;
use crate::AppState;

/// Public registration routes
pub fn router() -> Router<AppState> {
    Router::new().route("/sessions/:id/registrations", post(register))
}

/// Administrator registration routes
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/registrations", get(list_registrations))
        .route("/registrations/:id", delete(delete_registration))
        .route("/registrations/:id/attendance", put(set_attendance))
        .route("/registrations/:id/presence", put(confirm_presence))
        .route("/registrations/:id/payment-details", get(list_payment_details))
}

pub async fn register(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<CreateRegistrationRequest>,
) -> impl IntoResponse {
    // The body holds student contact data, only ids are logged
    info!("POST /api/sessions/{}/registrations", session_id);

    let command = RegistrationMapper::to_register_command(session_id, request);
    match state.registration_service.register(command).await {
        Ok(registration) => {
            info!("Registration {} created for session {}", registration.id, registration.session_id);
            let response = RegistrationResponse {
                registration: RegistrationMapper::to_dto(registration),
                success_message: "Registration confirmed".to_string(),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to register: {}", e);
            e.into_response()
        }
    }
}

pub async fn list_registrations(
    admin: AdminSession,
    State(state): State<AppState>,
    Query(query): Query<RegistrationListQuery>,
) -> impl IntoResponse {
    info!("GET /api/admin/registrations by {} - query: {:?}", admin.username, query);

    let filter = match RegistrationMapper::to_filter(query) {
        Ok(filter) => filter,
        Err(e) => return e.into_response(),
    };

    match state.registration_service.list_registrations(filter).await {
        Ok(listing) => {
            let response = RegistrationListResponse {
                registrations: RegistrationMapper::to_dto_list(listing.registrations),
                counters: listing.counters,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to list registrations: {}", e);
            e.into_response()
        }
    }
}

/// Marks or un-marks attendance; a ledger problem comes back as a warning
pub async fn set_attendance(
    admin: AdminSession,
    State(state): State<AppState>,
    Path(registration_id): Path<String>,
    Json(request): Json<SetAttendanceRequest>,
) -> impl IntoResponse {
    info!(
        "PUT /api/admin/registrations/{}/attendance by {} - request: {:?}",
        registration_id, admin.username, request
    );

    match state
        .reconciliation_service
        .set_attendance(&registration_id, request.attended)
        .await
    {
        Ok(outcome) => (StatusCode::OK, Json(RegistrationMapper::to_attendance_response(outcome))).into_response(),
        Err(e) => {
            error!("Failed to set attendance for {}: {}", registration_id, e);
            e.into_response()
        }
    }
}

pub async fn confirm_presence(
    admin: AdminSession,
    State(state): State<AppState>,
    Path(registration_id): Path<String>,
    Json(request): Json<ConfirmPresenceRequest>,
) -> impl IntoResponse {
    info!(
        "PUT /api/admin/registrations/{}/presence by {} - request: {:?}",
        registration_id, admin.username, request
    );

    match state
        .reconciliation_service
        .confirm_presence(&registration_id, request.confirmed)
        .await
    {
        Ok(registration) => {
            let response = RegistrationResponse {
                registration: RegistrationMapper::to_dto(registration),
                success_message: "Presence updated".to_string(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to confirm presence for {}: {}", registration_id, e);
            e.into_response()
        }
    }
}

pub async fn delete_registration(
    admin: AdminSession,
    State(state): State<AppState>,
    Path(registration_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/admin/registrations/{} by {}", registration_id, admin.username);

    match state.reconciliation_service.delete_registration(&registration_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!("Failed to delete registration {}: {}", registration_id, e);
            e.into_response()
        }
    }
}

pub async fn list_payment_details(
    admin: AdminSession,
    State(state): State<AppState>,
    Path(registration_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/admin/registrations/{}/payment-details by {}", registration_id, admin.username);

    match state.registration_service.payment_details(&registration_id).await {
        Ok(details) => {
            let response = PaymentDetailListResponse {
                payment_details: details.into_iter().map(RegistrationMapper::payment_detail_to_dto).collect(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to list payment details for registration {}: {}", registration_id, e);
            e.into_response()
        }
    }
}
