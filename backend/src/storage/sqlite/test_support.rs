//! Fixtures shared by the unit tests of repositories and services.

use chrono::{NaiveDate, NaiveTime};
use shared::{PledgeType, SessionStatus};

use crate::domain::models::catalog::{Subject, VolunteerTeacher};
use crate::domain::models::registration::Registration;
use crate::domain::models::session::ScheduledSession;
use crate::storage::sqlite::connection::DbConnection;
use crate::storage::traits::{CatalogStorage, Connection, RegistrationStorage, SessionStorage};

pub fn sample_session(id: &str) -> ScheduledSession {
    ScheduledSession {
        id: id.to_string(),
        title: format!("Aulão {}", id),
        subject_id: "subject-1".to_string(),
        teacher_id: None,
        date: NaiveDate::from_ymd_opt(2025, 5, 10).unwrap(),
        start_time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        location: "Sala 101".to_string(),
        max_participants: 50,
        topics: vec![],
        materials_needed: None,
        status: SessionStatus::Scheduled,
        file_url: None,
        created_at: "2025-04-01T12:00:00+00:00".to_string(),
        updated_at: "2025-04-01T12:00:00+00:00".to_string(),
    }
}

pub fn sample_registration(
    id: &str,
    session_id: &str,
    pledge_type: Option<PledgeType>,
    pledge_amount: Option<&str>,
) -> Registration {
    Registration {
        id: id.to_string(),
        session_id: session_id.to_string(),
        student_name: format!("Aluno {}", id),
        student_email: format!("{}@example.com", id),
        student_phone: None,
        student_registration_number: format!("2025{}", id),
        pledge_type,
        pledge_amount: pledge_amount.map(str::to_string),
        confirmed_presence: false,
        attended: false,
        created_at: "2025-04-02T12:00:00+00:00".to_string(),
        updated_at: "2025-04-02T12:00:00+00:00".to_string(),
    }
}

pub fn sample_subject(id: &str, name: &str) -> Subject {
    Subject {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        is_scheduled: true,
        is_seeking_teachers: false,
        created_at: "2025-01-01T00:00:00+00:00".to_string(),
    }
}

pub fn sample_teacher(id: &str, full_name: &str) -> VolunteerTeacher {
    VolunteerTeacher {
        id: id.to_string(),
        full_name: full_name.to_string(),
        email: format!("{}@example.com", id),
        phone: None,
        university: Some("UFPE".to_string()),
        course: None,
        availability: None,
        subjects_can_teach: vec!["Cálculo".to_string()],
        motivation: None,
        registration_number: "T-001".to_string(),
        photo_url: None,
        academic_history_url: "http://files/academic-histories/x.pdf".to_string(),
        status: VolunteerTeacher::PENDING_STATUS.to_string(),
        approved: false,
        created_at: "2025-01-01T00:00:00+00:00".to_string(),
        updated_at: "2025-01-01T00:00:00+00:00".to_string(),
    }
}

pub async fn seed_session(db: &DbConnection, id: &str) -> ScheduledSession {
    let session = sample_session(id);
    db.create_session_repository()
        .store_session(&session)
        .await
        .expect("Failed to seed session");
    session
}

pub async fn seed_subject(db: &DbConnection, id: &str, name: &str) -> Subject {
    let subject = sample_subject(id, name);
    db.create_catalog_repository()
        .store_subject(&subject)
        .await
        .expect("Failed to seed subject");
    subject
}

pub async fn seed_registration(
    db: &DbConnection,
    id: &str,
    session_id: &str,
    pledge_type: Option<PledgeType>,
    pledge_amount: Option<&str>,
) -> Registration {
    let registration = sample_registration(id, session_id, pledge_type, pledge_amount);
    db.create_registration_repository()
        .store_registration(&registration)
        .await
        .expect("Failed to seed registration");
    registration
}
