//! Volunteer instructor applications from the public form.
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::domain::commands::files::UploadedFile;
use crate::domain::commands::teacher_application::TeacherApplicationCommand;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::models::catalog::VolunteerTeacher;
use crate::storage::files::{FileFolder, FileStorage};
use crate::storage::traits::{CatalogStorage, Connection};

#[derive(Clone)]
pub struct TeacherApplicationService<C: Connection> {
    catalog_repository: C::CatalogRepository,
    file_storage: Arc<dyn FileStorage>,
}

impl<C: Connection> TeacherApplicationService<C> {
    pub fn new(connection: Arc<C>, file_storage: Arc<dyn FileStorage>) -> Self {
        Self {
            catalog_repository: connection.create_catalog_repository(),
            file_storage,
        }
    }

    /// Stores a pending application. The academic transcript is mandatory,
    /// the photo is not.
    pub async fn apply(
        &self,
        command: TeacherApplicationCommand,
        transcript: Option<UploadedFile>,
        photo: Option<UploadedFile>,
    ) -> DomainResult<VolunteerTeacher> {
        let full_name = required(&command.full_name, "Full name")?;
        let email = required(&command.email, "Email")?;
        if !email.contains('@') {
            return Err(DomainError::validation("Email must be a valid address"));
        }
        let registration_number = required(&command.registration_number, "Registration number")?;

        let subject_ids: Vec<&str> = command
            .subject_ids
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .collect();
        if subject_ids.is_empty() {
            return Err(DomainError::validation("Select at least one subject"));
        }
        let transcript = transcript
            .filter(|file| !file.bytes.is_empty())
            .ok_or_else(|| DomainError::validation("Academic transcript is required"))?;

        let mut subjects_can_teach = Vec::with_capacity(subject_ids.len());
        for subject_id in subject_ids {
            let subject = self
                .catalog_repository
                .get_subject(subject_id)
                .await?
                .ok_or_else(|| DomainError::not_found(format!("Subject {}", subject_id)))?;
            if !subjects_can_teach.contains(&subject.name) {
                subjects_can_teach.push(subject.name);
            }
        }

        info!("Receiving teacher application for {} subject(s)", subjects_can_teach.len());
        let academic_history_url = self.upload(FileFolder::AcademicHistories, &transcript).await?;
        let photo_url = match photo.filter(|file| !file.bytes.is_empty()) {
            Some(photo) => Some(self.upload(FileFolder::Photos, &photo).await?),
            None => None,
        };

        let now = Utc::now().to_rfc3339();
        let optional = |value: Option<String>| value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let teacher = VolunteerTeacher {
            id: uuid::Uuid::new_v4().to_string(),
            full_name,
            email,
            phone: optional(command.phone),
            university: optional(command.university),
            course: optional(command.course),
            availability: optional(command.availability),
            subjects_can_teach,
            motivation: optional(command.motivation),
            registration_number,
            photo_url,
            academic_history_url,
            status: VolunteerTeacher::PENDING_STATUS.to_string(),
            approved: false,
            created_at: now.clone(),
            updated_at: now,
        };
        self.catalog_repository.store_teacher(&teacher).await?;

        info!("Stored teacher application {}", teacher.id);
        Ok(teacher)
    }

    async fn upload(&self, folder: FileFolder, file: &UploadedFile) -> DomainResult<String> {
        self.file_storage
            .upload(folder, file)
            .await
            .map_err(|e| DomainError::Upload(format!("{:#}", e)))
    }
}

fn required(value: &str, field: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}
