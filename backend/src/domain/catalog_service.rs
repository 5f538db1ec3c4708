use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::domain::commands::catalog::SubjectSeed;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::models::catalog::Subject;
use crate::storage::files::slugify;
use crate::storage::traits::{CatalogStorage, Connection};

const MAX_SUBJECT_ID_LEN: usize = 40;

/// The subject catalog sessions are scheduled against
#[derive(Clone)]
pub struct CatalogService<C: Connection> {
    catalog_repository: C::CatalogRepository,
}

impl<C: Connection> CatalogService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            catalog_repository: connection.create_catalog_repository(),
        }
    }

    /// Subjects ordered by name
    pub async fn list_subjects(&self) -> DomainResult<Vec<Subject>> {
        Ok(self.catalog_repository.list_subjects().await?)
    }

    pub async fn create_subject(&self, seed: SubjectSeed) -> DomainResult<Subject> {
        let subject = Self::subject_from(seed)?;
        if self.catalog_repository.get_subject(&subject.id).await?.is_some() {
            return Err(DomainError::validation(format!("Subject {} already exists", subject.id)));
        }

        self.catalog_repository.store_subject(&subject).await?;
        info!("Created subject {} ({})", subject.id, subject.name);
        Ok(subject)
    }

    /// Stores the seeds whose id is not in the catalog yet.
    /// Returns how many were created.
    pub async fn ensure_subjects(&self, seeds: &[SubjectSeed]) -> DomainResult<u32> {
        let mut created = 0;
        for seed in seeds {
            let subject = Self::subject_from(seed.clone())?;
            if self.catalog_repository.get_subject(&subject.id).await?.is_none() {
                self.catalog_repository.store_subject(&subject).await?;
                created += 1;
            }
        }
        if created > 0 {
            info!("Seeded {} subjects", created);
        }
        Ok(created)
    }

    fn subject_from(seed: SubjectSeed) -> DomainResult<Subject> {
        let name = seed.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("Subject name is required"));
        }
        let id = match seed.id.trim() {
            "" => slugify(&name, MAX_SUBJECT_ID_LEN),
            id => id.to_string(),
        };
        if id.is_empty() {
            return Err(DomainError::validation(format!("Cannot derive an id for subject '{}'", name)));
        }

        Ok(Subject {
            id,
            name,
            description: seed.description.map(|d| d.trim().to_string()).filter(|d| !d.is_empty()),
            is_scheduled: false,
            is_seeking_teachers: true,
            created_at: Utc::now().to_rfc3339(),
        })
    }
}
