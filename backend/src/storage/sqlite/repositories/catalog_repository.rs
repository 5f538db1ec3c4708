use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row};

use crate::domain::models::catalog::{EmailTemplate, Subject, VolunteerTeacher};
use crate::storage::sqlite::connection::DbConnection;
use crate::storage::traits::CatalogStorage;

/// Subjects, volunteer instructors and email templates
#[derive(Clone)]
pub struct CatalogRepository {
    db: DbConnection,
}

impl CatalogRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn row_to_subject(row: &SqliteRow) -> Result<Subject> {
        Ok(Subject {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            is_scheduled: row.try_get("is_scheduled")?,
            is_seeking_teachers: row.try_get("is_seeking_teachers")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_teacher(row: &SqliteRow) -> Result<VolunteerTeacher> {
        let subjects: String = row.try_get("subjects_can_teach")?;
        Ok(VolunteerTeacher {
            id: row.try_get("id")?,
            full_name: row.try_get("full_name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            university: row.try_get("university")?,
            course: row.try_get("course")?,
            availability: row.try_get("availability")?,
            subjects_can_teach: serde_json::from_str(&subjects).context("invalid subjects_can_teach column")?,
            motivation: row.try_get("motivation")?,
            registration_number: row.try_get("registration_number")?,
            photo_url: row.try_get("photo_url")?,
            academic_history_url: row.try_get("academic_history_url")?,
            status: row.try_get("status")?,
            approved: row.try_get("approved")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl CatalogStorage for CatalogRepository {
    async fn store_subject(&self, subject: &Subject) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO subjects (id, name, description, is_scheduled, is_seeking_teachers, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&subject.id)
        .bind(&subject.name)
        .bind(&subject.description)
        .bind(subject.is_scheduled)
        .bind(subject.is_seeking_teachers)
        .bind(&subject.created_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn list_subjects(&self) -> Result<Vec<Subject>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, is_scheduled, is_seeking_teachers, created_at
            FROM subjects
            ORDER BY name ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::row_to_subject).collect()
    }

    async fn get_subject(&self, subject_id: &str) -> Result<Option<Subject>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, description, is_scheduled, is_seeking_teachers, created_at
            FROM subjects
            WHERE id = ?
            "#,
        )
        .bind(subject_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::row_to_subject).transpose()
    }

    async fn store_teacher(&self, teacher: &VolunteerTeacher) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO volunteer_teachers (
                id, full_name, email, phone, university, course, availability,
                subjects_can_teach, motivation, registration_number, photo_url,
                academic_history_url, status, approved, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&teacher.id)
        .bind(&teacher.full_name)
        .bind(&teacher.email)
        .bind(&teacher.phone)
        .bind(&teacher.university)
        .bind(&teacher.course)
        .bind(&teacher.availability)
        .bind(serde_json::to_string(&teacher.subjects_can_teach)?)
        .bind(&teacher.motivation)
        .bind(&teacher.registration_number)
        .bind(&teacher.photo_url)
        .bind(&teacher.academic_history_url)
        .bind(&teacher.status)
        .bind(teacher.approved)
        .bind(&teacher.created_at)
        .bind(&teacher.updated_at)
        .execute(self.db.pool())
        .await
        .context("failed to insert volunteer teacher")?;
        Ok(())
    }

    async fn get_teacher(&self, teacher_id: &str) -> Result<Option<VolunteerTeacher>> {
        let row = sqlx::query(
            r#"
            SELECT id, full_name, email, phone, university, course, availability,
                   subjects_can_teach, motivation, registration_number, photo_url,
                   academic_history_url, status, approved, created_at, updated_at
            FROM volunteer_teachers
            WHERE id = ?
            "#,
        )
        .bind(teacher_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::row_to_teacher).transpose()
    }

    async fn store_email_template(&self, template: &EmailTemplate) -> Result<()> {
        sqlx::query(
            "INSERT INTO email_templates (subject, body, signature, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&template.subject)
        .bind(&template.body)
        .bind(&template.signature)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn latest_email_template(&self) -> Result<Option<EmailTemplate>> {
        // id breaks ties between templates created in the same instant
        let row = sqlx::query(
            r#"
            SELECT subject, body, signature
            FROM email_templates
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(|r| EmailTemplate {
            subject: r.get("subject"),
            body: r.get("body"),
            signature: r.get("signature"),
        }))
    }
}
