//! # REST API for Administrator Login

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::post,
    Router,
};
use shared::LoginRequest;
use tracing::info;

use crate::io::rest::mappers::AdminMapper;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> impl IntoResponse {
    info!("POST /auth/login - username: {}", request.username);

    match state.admin_service.login(&request.username, &request.password).await {
        Ok(result) => (StatusCode::OK, Json(AdminMapper::to_login_response(result))).into_response(),
        Err(e) => e.into_response(),
    }
}
