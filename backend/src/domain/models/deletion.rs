use serde::{Deserialize, Serialize};

/// Ordered steps of a session deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SessionDeletionStep {
    CollectRegistrations,
    DeletePaymentDetails,
    UnlinkDonations,
    DeleteRegistrations,
    DeleteSession,
}

impl SessionDeletionStep {
    pub const ALL: [SessionDeletionStep; 5] = [
        SessionDeletionStep::CollectRegistrations,
        SessionDeletionStep::DeletePaymentDetails,
        SessionDeletionStep::UnlinkDonations,
        SessionDeletionStep::DeleteRegistrations,
        SessionDeletionStep::DeleteSession,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionDeletionStep::CollectRegistrations => "collect_registrations",
            SessionDeletionStep::DeletePaymentDetails => "delete_payment_details",
            SessionDeletionStep::UnlinkDonations => "unlink_donations",
            SessionDeletionStep::DeleteRegistrations => "delete_registrations",
            SessionDeletionStep::DeleteSession => "delete_session",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.as_str() == value)
    }

    pub fn next(&self) -> Option<Self> {
        let position = Self::ALL.iter().position(|step| step == self)?;
        Self::ALL.get(position + 1).copied()
    }

    /// Steps still to run after `completed`, or every step when nothing ran yet
    pub fn remaining_after(completed: Option<Self>) -> Vec<Self> {
        match completed {
            None => Self::ALL.to_vec(),
            Some(done) => Self::ALL.into_iter().filter(|step| *step > done).collect(),
        }
    }
}

impl std::fmt::Display for SessionDeletionStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress record of an in-flight session deletion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDeletion {
    pub session_id: String,
    /// Registration ids collected by the first step
    pub registration_ids: Vec<String>,
    pub completed_step: Option<SessionDeletionStep>,
    pub updated_at: String,
}
