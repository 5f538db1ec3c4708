use shared::{
    CreateSubjectRequest, EmailTemplate as SharedEmailTemplate, PlatformStatistics as SharedStatistics,
    Subject as SharedSubject,
};

use crate::domain::commands::catalog::SubjectSeed;
use crate::domain::models::catalog::{EmailTemplate, Subject};
use crate::domain::models::statistics::PlatformStatistics;

pub struct CatalogMapper;

impl CatalogMapper {
    pub fn subject_to_dto(domain: Subject) -> SharedSubject {
        SharedSubject {
            id: domain.id,
            name: domain.name,
            description: domain.description,
            is_scheduled: domain.is_scheduled,
            is_seeking_teachers: domain.is_seeking_teachers,
        }
    }

    pub fn to_subject_seed(request: CreateSubjectRequest) -> SubjectSeed {
        SubjectSeed {
            id: request.id.unwrap_or_default(),
            name: request.name,
            description: request.description,
        }
    }

    pub fn statistics_to_dto(domain: PlatformStatistics) -> SharedStatistics {
        SharedStatistics {
            year: domain.year,
            total_classes: domain.total_classes,
            total_students: domain.total_students,
            total_food_kg: domain.total_food_kg,
        }
    }

    pub fn template_to_dto(domain: EmailTemplate) -> SharedEmailTemplate {
        SharedEmailTemplate {
            subject: domain.subject,
            body: domain.body,
            signature: domain.signature,
        }
    }

    pub fn template_from_dto(dto: SharedEmailTemplate) -> EmailTemplate {
        EmailTemplate {
            subject: dto.subject,
            body: dto.body,
            signature: dto.signature,
        }
    }
}
