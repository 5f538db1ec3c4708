//! Domain-level command and result types.
//!
//! Services take these instead of the `shared` DTOs; the REST layer maps
//! between the two.

pub mod registration {
    use crate::domain::models::registration::Registration;
    use shared::{PledgeType, RegistrationCounters};

    /// Public sign-up for a session
    #[derive(Debug, Clone)]
    pub struct RegisterCommand {
        pub session_id: String,
        pub student_name: String,
        pub student_email: String,
        pub student_phone: Option<String>,
        pub student_registration_number: String,
        pub pledge_type: Option<PledgeType>,
        pub pledge_amount: Option<String>,
        pub payment_proof_file_name: Option<String>,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum PresenceFilter {
        #[default]
        All,
        Confirmed,
        Pending,
        Attended,
    }

    impl PresenceFilter {
        pub fn parse(value: &str) -> Option<Self> {
            match value.trim() {
                "" | "all" => Some(PresenceFilter::All),
                "confirmed" => Some(PresenceFilter::Confirmed),
                "pending" => Some(PresenceFilter::Pending),
                "attended" => Some(PresenceFilter::Attended),
                _ => None,
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum PledgeFilter {
        #[default]
        All,
        None,
        Only(PledgeType),
    }

    impl PledgeFilter {
        pub fn parse(value: &str) -> Option<Self> {
            match value.trim() {
                "" | "all" => Some(PledgeFilter::All),
                "none" => Some(PledgeFilter::None),
                other => PledgeType::parse(other).map(PledgeFilter::Only),
            }
        }
    }

    /// Admin listing filter
    #[derive(Debug, Clone, Default)]
    pub struct RegistrationFilter {
        pub session_id: Option<String>,
        pub search: Option<String>,
        pub presence: PresenceFilter,
        pub pledge: PledgeFilter,
    }

    #[derive(Debug, Clone)]
    pub struct RegistrationListing {
        pub registrations: Vec<Registration>,
        /// Computed over the unfiltered set
        pub counters: RegistrationCounters,
    }
}

pub mod reconciliation {
    use crate::domain::models::deletion::SessionDeletionStep;
    use crate::domain::models::registration::Registration;

    /// Effect of an attendance change on the donation ledger
    #[derive(Debug, Clone, PartialEq)]
    pub enum LedgerOutcome {
        /// Not attended, or no monetary pledge
        NotApplicable,
        Recorded { donation_id: String },
        /// The registration's existing money entry, when it could be read back
        AlreadyRecorded { donation_id: Option<String> },
        /// Attendance was saved but the ledger insert failed
        Failed { warning: String },
    }

    #[derive(Debug, Clone)]
    pub struct AttendanceOutcome {
        pub registration: Registration,
        pub ledger: LedgerOutcome,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct SessionDeletionReport {
        pub session_id: String,
        pub executed_steps: Vec<SessionDeletionStep>,
        pub resumed: bool,
    }
}

pub mod session {
    use chrono::NaiveDate;
    use shared::SessionStatus;

    /// Create or update payload; times are "HH:MM"
    #[derive(Debug, Clone)]
    pub struct SessionCommand {
        pub title: String,
        pub subject_id: String,
        pub teacher_id: Option<String>,
        pub date: NaiveDate,
        pub start_time: String,
        pub end_time: String,
        pub location: String,
        pub max_participants: Option<u32>,
        /// Comma separated
        pub topics: String,
        pub materials_needed: Option<String>,
        /// Only honoured on update
        pub status: Option<SessionStatus>,
    }

    /// Read model with the display names resolved
    #[derive(Debug, Clone)]
    pub struct SessionView {
        pub session: crate::domain::models::session::ScheduledSession,
        pub subject_name: Option<String>,
        pub teacher_name: Option<String>,
    }
}

pub mod files {
    /// An uploaded file as received from a multipart form
    #[derive(Debug, Clone)]
    pub struct UploadedFile {
        pub file_name: String,
        pub content_type: Option<String>,
        pub bytes: Vec<u8>,
    }
}

pub mod catalog {
    use serde::{Deserialize, Serialize};

    /// Subject created at startup when missing, or by an administrator.
    /// An empty `id` is derived from the name.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct SubjectSeed {
        #[serde(default)]
        pub id: String,
        pub name: String,
        #[serde(default)]
        pub description: Option<String>,
    }

    impl SubjectSeed {
        pub fn new(id: &str, name: &str) -> Self {
            Self {
                id: id.to_string(),
                name: name.to_string(),
                description: None,
            }
        }
    }
}

pub mod notification {
    #[derive(Debug, Clone, PartialEq)]
    pub struct NotificationReport {
        pub message: String,
        pub sent: u32,
        pub failed: u32,
    }
}

pub mod finance {
    use chrono::NaiveDate;
    use shared::DonationKind;

    #[derive(Debug, Clone)]
    pub struct ManualDonationCommand {
        pub kind: DonationKind,
        pub session_id: Option<String>,
        pub amount: Option<f64>,
        pub food_weight_kg: Option<f64>,
        pub description: Option<String>,
        pub institution: Option<String>,
        pub donation_date: Option<NaiveDate>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct SessionTotal {
        pub session_id: Option<String>,
        pub session_title: String,
        pub session_date: Option<NaiveDate>,
        pub money_amount: f64,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct FinanceSummaryResult {
        pub total_money: f64,
        pub by_session: Vec<SessionTotal>,
        pub sessions_with_donations: u32,
    }

    /// Public yearly view of the ledger
    #[derive(Debug, Clone, PartialEq)]
    pub struct TransparencyReport {
        pub year: i32,
        /// Years with at least one ledger entry, newest first
        pub available_years: Vec<i32>,
        pub total_money: f64,
        pub total_food_kg: f64,
        /// Distinct institutions that received donations that year
        pub institutions: u32,
        pub sessions_held: u32,
        pub donations: Vec<crate::domain::models::donation::Donation>,
    }
}

pub mod teacher_application {
    #[derive(Debug, Clone, Default)]
    pub struct TeacherApplicationCommand {
        pub full_name: String,
        pub email: String,
        pub phone: Option<String>,
        pub university: Option<String>,
        pub course: Option<String>,
        pub availability: Option<String>,
        pub subject_ids: Vec<String>,
        pub motivation: Option<String>,
        pub registration_number: String,
    }
}

pub mod administrator {
    use crate::domain::models::administrator::Administrator;

    #[derive(Debug, Clone)]
    pub struct CreateAdministratorCommand {
        pub username: String,
        pub full_name: String,
        pub email: Option<String>,
        pub password: String,
    }

    #[derive(Debug, Clone)]
    pub struct UpdateAdministratorCommand {
        pub admin_id: String,
        pub username: String,
        pub full_name: String,
        pub email: Option<String>,
        pub password: Option<String>,
    }

    #[derive(Debug, Clone)]
    pub struct LoginResult {
        pub token: String,
        pub administrator: Administrator,
    }
}
