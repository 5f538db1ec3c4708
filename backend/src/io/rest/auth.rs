//! Administrator authentication for REST handlers.
//!
//! Handlers that need an administrator take [`AdminSession`] as an argument;
//! the extractor rejects the request before the handler runs when the bearer
//! token is missing, malformed, expired, signed with another key, or
//! belongs to an administrator account that has since been deleted.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
    response::{IntoResponse, Response},
};

use crate::domain::error::DomainError;
use crate::domain::models::administrator::AdminSession;
use crate::AppState;

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminSession {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| DomainError::Unauthorized("Missing bearer token".to_string()).into_response())?;
        let session = state.auth_tokens.verify(token).map_err(IntoResponse::into_response)?;
        state
            .admin_service
            .authorize(session)
            .await
            .map_err(IntoResponse::into_response)
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
