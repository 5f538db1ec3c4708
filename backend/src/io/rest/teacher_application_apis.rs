//! # REST API for Volunteer Instructor Applications
//!
//! Multipart form: text fields named after [`TeacherApplicationCommand`],
//! `subject_ids` repeated or comma separated, and the files
//! `academic_history` (required) and `photo` (optional).

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::post,
    Router,
};
use shared::TeacherApplicationResponse;
use tracing::{error, info};

use crate::domain::commands::teacher_application::TeacherApplicationCommand;
use crate::io::rest::uploads::FormData;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/teacher-applications", post(submit_application))
}

pub async fn submit_application(State(state): State<AppState>, multipart: Multipart) -> impl IntoResponse {
    info!("POST /api/teacher-applications");

    let mut form = match FormData::read(multipart).await {
        Ok(form) => form,
        Err(e) => return e.into_response(),
    };

    let command = TeacherApplicationCommand {
        full_name: form.text_or_empty("full_name"),
        email: form.text_or_empty("email"),
        phone: form.text("phone"),
        university: form.text("university"),
        course: form.text("course"),
        availability: form.text("availability"),
        subject_ids: form.list("subject_ids"),
        motivation: form.text("motivation"),
        registration_number: form.text_or_empty("registration_number"),
    };
    let transcript = form.take_file("academic_history");
    let photo = form.take_file("photo");

    match state
        .teacher_application_service
        .apply(command, transcript, photo)
        .await
    {
        Ok(teacher) => {
            let response = TeacherApplicationResponse {
                id: teacher.id,
                status: teacher.status,
                success_message: "Application received".to_string(),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to store teacher application: {}", e);
            e.into_response()
        }
    }
}
