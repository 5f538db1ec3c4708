use crate::domain::models::deletion::SessionDeletionStep;

/// Errors surfaced by domain services
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("storage failure: {0}")]
    Storage(String),

    #[error("upload failed: {0}")]
    Upload(String),

    #[error("{sent} notification(s) sent, {failed} failed")]
    PartialFailure { sent: u32, failed: u32 },

    #[error("no notification could be sent, {failed} failed")]
    DeliveryFailed { failed: u32 },

    #[error("session deletion stopped at {step}: {message}")]
    DeletionStepFailed {
        step: SessionDeletionStep,
        message: String,
    },

    #[error("{0}")]
    Unauthorized(String),
}

impl DomainError {
    pub fn not_found(what: impl Into<String>) -> Self {
        DomainError::NotFound(what.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation(message.into())
    }

    /// Stable machine-readable name used in error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::NotFound(_) => "not_found",
            DomainError::Validation(_) => "validation",
            DomainError::Storage(_) => "storage",
            DomainError::Upload(_) => "upload",
            DomainError::PartialFailure { .. } => "partial_failure",
            DomainError::DeliveryFailed { .. } => "delivery_failed",
            DomainError::DeletionStepFailed { .. } => "deletion_step_failed",
            DomainError::Unauthorized(_) => "unauthorized",
        }
    }
}

impl From<anyhow::Error> for DomainError {
    fn from(error: anyhow::Error) -> Self {
        // Keep the whole context chain, sqlx messages alone are rarely useful
        DomainError::Storage(format!("{:#}", error))
    }
}

pub type DomainResult<T> = std::result::Result<T, DomainError>;
