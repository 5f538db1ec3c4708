//! # REST API for Administrator Accounts

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, put},
    Router,
};
use shared::{AdministratorListResponse, CreateAdministratorRequest, UpdateAdministratorRequest};
use tracing::{error, info};

use crate::domain::models::administrator::AdminSession;
use crate::io::rest::mappers::AdminMapper;
use crate::AppState;

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/administrators", get(list_administrators).post(create_administrator))
        .route("/administrators/:id", put(update_administrator).delete(delete_administrator))
}

pub async fn list_administrators(admin: AdminSession, State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/admin/administrators by {}", admin.username);

    match state.admin_service.list_administrators().await {
        Ok(administrators) => {
            let response = AdministratorListResponse {
                administrators: AdminMapper::to_dto_list(administrators),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to list administrators: {}", e);
            e.into_response()
        }
    }
}

pub async fn create_administrator(
    admin: AdminSession,
    State(state): State<AppState>,
    Json(request): Json<CreateAdministratorRequest>,
) -> impl IntoResponse {
    // Request bodies carry passwords, log the username only
    info!("POST /api/admin/administrators by {} - username: {}", admin.username, request.username);

    match state
        .admin_service
        .create_administrator(AdminMapper::to_create_command(request))
        .await
    {
        Ok(created) => (StatusCode::CREATED, Json(AdminMapper::to_dto(created))).into_response(),
        Err(e) => {
            error!("Failed to create administrator: {}", e);
            e.into_response()
        }
    }
}

pub async fn update_administrator(
    admin: AdminSession,
    State(state): State<AppState>,
    Path(admin_id): Path<String>,
    Json(request): Json<UpdateAdministratorRequest>,
) -> impl IntoResponse {
    info!("PUT /api/admin/administrators/{} by {}", admin_id, admin.username);

    match state
        .admin_service
        .update_administrator(AdminMapper::to_update_command(admin_id.clone(), request))
        .await
    {
        Ok(updated) => (StatusCode::OK, Json(AdminMapper::to_dto(updated))).into_response(),
        Err(e) => {
            error!("Failed to update administrator {}: {}", admin_id, e);
            e.into_response()
        }
    }
}

pub async fn delete_administrator(
    admin: AdminSession,
    State(state): State<AppState>,
    Path(admin_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/admin/administrators/{} by {}", admin_id, admin.username);

    match state.admin_service.delete_administrator(&admin, &admin_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!("Failed to delete administrator {}: {}", admin_id, e);
            e.into_response()
        }
    }
}
