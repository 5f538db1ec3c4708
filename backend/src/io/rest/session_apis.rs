//! # REST API for Sessions
//!
//! Public listing plus the administrator endpoints for scheduling, class
//! material, reminder emails and deletion.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use shared::{
    CreateSessionRequest, NotifyParticipantsResponse, SessionListResponse, SessionResponse,
    UpdateSessionRequest,
};
use tracing::{error, info, warn};

use crate::domain::error::DomainError;
use crate::domain::models::administrator::AdminSession;
use crate::io::rest::mappers::SessionMapper;
use crate::io::rest::uploads::FormData;
use crate::AppState;

/// Public session routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sessions", get(list_sessions))
        .route("/sessions/:id", get(get_session))
}

/// Administrator session routes
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/:id", put(update_session).delete(delete_session))
        .route("/sessions/:id/material", post(attach_material))
        .route("/sessions/:id/notify", post(notify_participants))
}

pub async fn list_sessions(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/sessions");

    match state.session_service.list_sessions().await {
        Ok(views) => {
            let response = SessionListResponse {
                sessions: SessionMapper::to_dto_list(views),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to list sessions: {}", e);
            e.into_response()
        }
    }
}

pub async fn get_session(State(state): State<AppState>, Path(session_id): Path<String>) -> impl IntoResponse {
    info!("GET /api/sessions/{}", session_id);

    match state.session_service.get_session(&session_id).await {
        Ok(view) => (StatusCode::OK, Json(SessionMapper::to_dto(view))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_session(
    admin: AdminSession,
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> impl IntoResponse {
    info!("POST /api/admin/sessions by {} - request: {:?}", admin.username, request);

    match state
        .session_service
        .create_session(SessionMapper::create_to_command(request))
        .await
    {
        Ok(view) => {
            let response = SessionResponse {
                session: SessionMapper::to_dto(view),
                success_message: "Session created".to_string(),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to create session: {}", e);
            e.into_response()
        }
    }
}

pub async fn update_session(
    admin: AdminSession,
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<UpdateSessionRequest>,
) -> impl IntoResponse {
    info!("PUT /api/admin/sessions/{} by {} - request: {:?}", session_id, admin.username, request);

    match state
        .session_service
        .update_session(&session_id, SessionMapper::update_to_command(request))
        .await
    {
        Ok(view) => {
            let response = SessionResponse {
                session: SessionMapper::to_dto(view),
                success_message: "Session updated".to_string(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to update session {}: {}", session_id, e);
            e.into_response()
        }
    }
}

/// Runs (or resumes) the multi-step deletion
pub async fn delete_session(
    admin: AdminSession,
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/admin/sessions/{} by {}", session_id, admin.username);

    match state.reconciliation_service.delete_session(&session_id).await {
        Ok(report) => (StatusCode::OK, Json(SessionMapper::to_deletion_response(report))).into_response(),
        Err(e) => {
            error!("Failed to delete session {}: {}", session_id, e);
            e.into_response()
        }
    }
}

/// Multipart form with a single `file` field
pub async fn attach_material(
    admin: AdminSession,
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    multipart: Multipart,
) -> impl IntoResponse {
    info!("POST /api/admin/sessions/{}/material by {}", session_id, admin.username);

    let mut form = match FormData::read(multipart).await {
        Ok(form) => form,
        Err(e) => return e.into_response(),
    };
    let Some(file) = form.take_file("file") else {
        return DomainError::validation("A 'file' field is required").into_response();
    };

    match state.session_service.attach_material(&session_id, file).await {
        Ok(view) => {
            let response = SessionResponse {
                session: SessionMapper::to_dto(view),
                success_message: "Material uploaded".to_string(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to attach material to session {}: {}", session_id, e);
            e.into_response()
        }
    }
}

/// 200 when every email went out, 207 with the counts when some failed,
/// 502 when none could be sent
pub async fn notify_participants(
    admin: AdminSession,
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    info!("POST /api/admin/sessions/{}/notify by {}", session_id, admin.username);

    match state.notification_service.notify_participants(&session_id).await {
        Ok(report) => {
            let response = NotifyParticipantsResponse {
                message: report.message,
                success_count: report.sent,
                error_count: report.failed,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(DomainError::PartialFailure { sent, failed }) => {
            warn!("Session {} notifications partially failed: {} sent, {} failed", session_id, sent, failed);
            let response = NotifyParticipantsResponse {
                message: format!("Emails sent: {} succeeded, {} failed", sent, failed),
                success_count: sent,
                error_count: failed,
            };
            (StatusCode::MULTI_STATUS, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to notify participants of session {}: {}", session_id, e);
            e.into_response()
        }
    }
}
