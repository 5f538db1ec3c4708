//! Scheduling of tutoring sessions and their class material.
use chrono::Utc;
use shared::SessionStatus;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::domain::commands::files::UploadedFile;
use crate::domain::commands::session::{SessionCommand, SessionView};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::models::session::{
    normalize_location, parse_time, parse_topics, ScheduledSession, DEFAULT_MAX_PARTICIPANTS,
};
use crate::domain::models::statistics::StatisticField;
use crate::domain::statistics_service::StatisticsService;
use crate::storage::files::{FileFolder, FileStorage};
use crate::storage::traits::{CatalogStorage, Connection, SessionStorage};

#[derive(Clone)]
pub struct SessionService<C: Connection> {
    session_repository: C::SessionRepository,
    catalog_repository: C::CatalogRepository,
    statistics_service: StatisticsService<C>,
    file_storage: Arc<dyn FileStorage>,
}

impl<C: Connection> SessionService<C> {
    pub fn new(
        connection: Arc<C>,
        statistics_service: StatisticsService<C>,
        file_storage: Arc<dyn FileStorage>,
    ) -> Self {
        Self {
            session_repository: connection.create_session_repository(),
            catalog_repository: connection.create_catalog_repository(),
            statistics_service,
            file_storage,
        }
    }

    pub async fn create_session(&self, command: SessionCommand) -> DomainResult<SessionView> {
        info!("Creating session '{}' on {}", command.title, command.date);

        let now = Utc::now().to_rfc3339();
        let mut session = self.build_session(uuid::Uuid::new_v4().to_string(), command).await?;
        session.created_at = now.clone();
        session.updated_at = now;

        self.session_repository.store_session(&session).await?;
        self.statistics_service
            .increment_quietly(StatisticField::TotalClasses)
            .await;

        info!("Created session {}", session.id);
        self.to_view(session).await
    }

    pub async fn update_session(&self, session_id: &str, command: SessionCommand) -> DomainResult<SessionView> {
        info!("Updating session {}", session_id);

        let existing = self.load_session(session_id).await?;
        let mut session = self.build_session(existing.id.clone(), command).await?;
        session.file_url = existing.file_url;
        session.created_at = existing.created_at;
        session.updated_at = Utc::now().to_rfc3339();

        if !self.session_repository.update_session(&session).await? {
            return Err(DomainError::not_found(format!("Session {}", session_id)));
        }
        self.to_view(session).await
    }

    pub async fn get_session(&self, session_id: &str) -> DomainResult<SessionView> {
        let session = self.load_session(session_id).await?;
        self.to_view(session).await
    }

    /// Every session, date then start time ascending
    pub async fn list_sessions(&self) -> DomainResult<Vec<SessionView>> {
        let sessions = self.session_repository.list_sessions().await?;
        let subjects: HashMap<String, String> = self
            .catalog_repository
            .list_subjects()
            .await?
            .into_iter()
            .map(|subject| (subject.id, subject.name))
            .collect();

        let mut teachers: HashMap<String, Option<String>> = HashMap::new();
        let mut views = Vec::with_capacity(sessions.len());
        for session in sessions {
            let teacher_name = match &session.teacher_id {
                Some(teacher_id) => {
                    if !teachers.contains_key(teacher_id) {
                        let name = self
                            .catalog_repository
                            .get_teacher(teacher_id)
                            .await?
                            .map(|teacher| teacher.full_name);
                        teachers.insert(teacher_id.clone(), name);
                    }
                    teachers.get(teacher_id).cloned().flatten()
                }
                None => None,
            };
            views.push(SessionView {
                subject_name: subjects.get(&session.subject_id).cloned(),
                teacher_name,
                session,
            });
        }
        Ok(views)
    }

    /// Uploads class material and links it to the session
    pub async fn attach_material(&self, session_id: &str, file: UploadedFile) -> DomainResult<SessionView> {
        let mut session = self.load_session(session_id).await?;
        if file.bytes.is_empty() {
            return Err(DomainError::validation("Uploaded file is empty"));
        }

        info!("Uploading material '{}' for session {}", file.file_name, session_id);
        let url = self
            .file_storage
            .upload(FileFolder::ClassFiles, &file)
            .await
            .map_err(|e| DomainError::Upload(format!("{:#}", e)))?;

        let updated_at = Utc::now().to_rfc3339();
        if !self.session_repository.set_file_url(session_id, &url, &updated_at).await? {
            return Err(DomainError::not_found(format!("Session {}", session_id)));
        }

        session.file_url = Some(url);
        session.updated_at = updated_at;
        self.to_view(session).await
    }

    async fn build_session(&self, id: String, command: SessionCommand) -> DomainResult<ScheduledSession> {
        let title = command.title.trim();
        if title.is_empty() {
            return Err(DomainError::validation("Session title is required"));
        }

        let start_time = parse_time(&command.start_time)
            .ok_or_else(|| DomainError::validation(format!("Invalid start time '{}'", command.start_time)))?;
        let end_time = parse_time(&command.end_time)
            .ok_or_else(|| DomainError::validation(format!("Invalid end time '{}'", command.end_time)))?;
        if start_time >= end_time {
            return Err(DomainError::validation("Start time must be before end time"));
        }

        let max_participants = command.max_participants.unwrap_or(DEFAULT_MAX_PARTICIPANTS);
        if max_participants == 0 {
            return Err(DomainError::validation("Maximum participants must be at least 1"));
        }

        if self.catalog_repository.get_subject(&command.subject_id).await?.is_none() {
            return Err(DomainError::not_found(format!("Subject {}", command.subject_id)));
        }

        let teacher_id = command
            .teacher_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
        if let Some(teacher_id) = &teacher_id {
            if self.catalog_repository.get_teacher(teacher_id).await?.is_none() {
                return Err(DomainError::not_found(format!("Teacher {}", teacher_id)));
            }
        }

        let mut session = ScheduledSession {
            id,
            title: title.to_string(),
            subject_id: command.subject_id,
            teacher_id,
            date: command.date,
            start_time,
            end_time,
            location: normalize_location(&command.location),
            max_participants,
            topics: parse_topics(&command.topics),
            materials_needed: command
                .materials_needed
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty()),
            status: command.status.unwrap_or(SessionStatus::Scheduled),
            file_url: None,
            created_at: String::new(),
            updated_at: String::new(),
        };
        session.status = session.effective_status();
        Ok(session)
    }

    async fn to_view(&self, session: ScheduledSession) -> DomainResult<SessionView> {
        let subject_name = self
            .catalog_repository
            .get_subject(&session.subject_id)
            .await?
            .map(|subject| subject.name);
        let teacher_name = match &session.teacher_id {
            Some(teacher_id) => self
                .catalog_repository
                .get_teacher(teacher_id)
                .await?
                .map(|teacher| teacher.full_name),
            None => None,
        };
        Ok(SessionView {
            session,
            subject_name,
            teacher_name,
        })
    }

    async fn load_session(&self, session_id: &str) -> DomainResult<ScheduledSession> {
        self.session_repository
            .get_session(session_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Session {}", session_id)))
    }
}
