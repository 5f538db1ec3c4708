use shared::{
    CreateSessionRequest, ScheduledSession as SharedSession, SessionDeletionResponse,
    UpdateSessionRequest,
};

use crate::domain::commands::reconciliation::SessionDeletionReport;
use crate::domain::commands::session::{SessionCommand, SessionView};
use crate::domain::models::session::format_time;

pub struct SessionMapper;

impl SessionMapper {
    /// Domain view to DTO; the status on the wire is the effective one
    pub fn to_dto(view: SessionView) -> SharedSession {
        let status = view.session.effective_status();
        let session = view.session;
        SharedSession {
            id: session.id,
            title: session.title,
            subject_id: session.subject_id,
            subject_name: view.subject_name,
            teacher_id: session.teacher_id,
            teacher_name: view.teacher_name,
            date: session.date,
            start_time: format_time(session.start_time),
            end_time: format_time(session.end_time),
            location: session.location,
            max_participants: session.max_participants,
            topics: session.topics,
            materials_needed: session.materials_needed,
            status,
            file_url: session.file_url,
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }

    pub fn to_dto_list(views: Vec<SessionView>) -> Vec<SharedSession> {
        views.into_iter().map(Self::to_dto).collect()
    }

    pub fn create_to_command(request: CreateSessionRequest) -> SessionCommand {
        SessionCommand {
            title: request.title,
            subject_id: request.subject_id,
            teacher_id: request.teacher_id,
            date: request.date,
            start_time: request.start_time,
            end_time: request.end_time,
            location: request.location,
            max_participants: request.max_participants,
            topics: request.topics,
            materials_needed: request.materials_needed,
            status: None,
        }
    }

    pub fn update_to_command(request: UpdateSessionRequest) -> SessionCommand {
        SessionCommand {
            title: request.title,
            subject_id: request.subject_id,
            teacher_id: request.teacher_id,
            date: request.date,
            start_time: request.start_time,
            end_time: request.end_time,
            location: request.location,
            max_participants: request.max_participants,
            topics: request.topics,
            materials_needed: request.materials_needed,
            status: request.status,
        }
    }

    pub fn to_deletion_response(report: SessionDeletionReport) -> SessionDeletionResponse {
        let success_message = if report.resumed {
            "Session deletion resumed and completed".to_string()
        } else {
            "Session deleted".to_string()
        };
        SessionDeletionResponse {
            session_id: report.session_id,
            executed_steps: report.executed_steps.iter().map(|step| step.as_str().to_string()).collect(),
            resumed: report.resumed,
            success_message,
        }
    }
}
