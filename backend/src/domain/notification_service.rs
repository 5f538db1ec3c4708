//! Bulk reminder emails to everyone registered for a session.
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::commands::notification::NotificationReport;
use crate::domain::email_service::{EmailSender, OutgoingEmail};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::models::catalog::EmailTemplate;
use crate::domain::template::{html_document, render, TemplateValues};
use crate::storage::traits::{CatalogStorage, Connection, RegistrationStorage, SessionStorage};

pub const NO_REGISTRATIONS_MESSAGE: &str = "Nenhuma inscrição encontrada para este aulão";

#[derive(Clone)]
pub struct NotificationService<C: Connection> {
    session_repository: C::SessionRepository,
    registration_repository: C::RegistrationRepository,
    catalog_repository: C::CatalogRepository,
    email_sender: Arc<dyn EmailSender>,
}

impl<C: Connection> NotificationService<C> {
    pub fn new(connection: Arc<C>, email_sender: Arc<dyn EmailSender>) -> Self {
        Self {
            session_repository: connection.create_session_repository(),
            registration_repository: connection.create_registration_repository(),
            catalog_repository: connection.create_catalog_repository(),
            email_sender,
        }
    }

    /// Sends one email per registration.
    ///
    /// Every recipient is attempted. When every send fails the result is
    /// [`DomainError::DeliveryFailed`]; when only some fail it is
    /// [`DomainError::PartialFailure`] carrying both counts.
    pub async fn notify_participants(&self, session_id: &str) -> DomainResult<NotificationReport> {
        let session = self
            .session_repository
            .get_session(session_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Session {}", session_id)))?;

        let registrations = self.registration_repository.list_registrations(Some(session_id)).await?;
        if registrations.is_empty() {
            info!("No registrations to notify for session {}", session_id);
            return Ok(NotificationReport {
                message: NO_REGISTRATIONS_MESSAGE.to_string(),
                sent: 0,
                failed: 0,
            });
        }

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
        let template = self.current_template().await?;

        let values = TemplateValues::for_session(&session, subject_name.as_deref(), teacher_name.as_deref());
        let subject = render(&template.subject, &values);
        let mut body = render(&template.body, &values);
        if let Some(file_url) = &session.file_url {
            body.push_str(&format!("\n\n📎 Arquivo do aulão: {}", file_url));
        }
        let html_body = html_document(&body, &render(&template.signature, &values));

        info!("Notifying {} participant(s) of session {}", registrations.len(), session_id);
        let mut sent = 0u32;
        let mut failed = 0u32;
        for registration in &registrations {
            let email = OutgoingEmail {
                to: registration.student_email.clone(),
                subject: subject.clone(),
                html_body: html_body.clone(),
            };
            match self.email_sender.send(&email).await {
                Ok(()) => sent += 1,
                Err(e) => {
                    warn!("Failed to notify registration {}: {:#}", registration.id, e);
                    failed += 1;
                }
            }
        }

        info!("Session {} notifications: {} sent, {} failed", session_id, sent, failed);
        if sent == 0 {
            return Err(DomainError::DeliveryFailed { failed });
        }
        if failed > 0 {
            return Err(DomainError::PartialFailure { sent, failed });
        }
        Ok(NotificationReport {
            message: format!("Emails sent: {} succeeded, {} failed", sent, failed),
            sent,
            failed,
        })
    }

    /// Latest saved template, or the built-in one when none was saved
    pub async fn current_template(&self) -> DomainResult<EmailTemplate> {
        Ok(self
            .catalog_repository
            .latest_email_template()
            .await?
            .unwrap_or_default())
    }

    /// Saves a new template version; older versions stay in storage
    pub async fn save_template(&self, template: EmailTemplate) -> DomainResult<EmailTemplate> {
        if template.subject.trim().is_empty() || template.body.trim().is_empty() {
            return Err(DomainError::validation("Email template needs a subject and a body"));
        }
        self.catalog_repository.store_email_template(&template).await?;
        info!("Saved a new email template");
        Ok(template)
    }
}
