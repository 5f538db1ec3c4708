//! Wire types shared between the backend and its HTTP clients.
//!
//! Enum spellings follow the values stored by the original platform
//! (`pagamento_antecipado`, `dinheiro`, ...) so historical rows and existing
//! clients keep working.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a student promised to bring or pay when registering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PledgeType {
    /// Non-perishable food brought to the session
    #[serde(rename = "alimento")]
    Food,
    /// Money paid at the door
    #[serde(rename = "pagamento_hora")]
    PayAtEvent,
    /// Money paid before the session, usually with a proof upload
    #[serde(rename = "pagamento_antecipado")]
    PayInAdvance,
    /// Generic money pledge found in older registrations
    #[serde(rename = "dinheiro")]
    Money,
}

impl PledgeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PledgeType::Food => "alimento",
            PledgeType::PayAtEvent => "pagamento_hora",
            PledgeType::PayInAdvance => "pagamento_antecipado",
            PledgeType::Money => "dinheiro",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "alimento" => Some(PledgeType::Food),
            "pagamento_hora" => Some(PledgeType::PayAtEvent),
            "pagamento_antecipado" => Some(PledgeType::PayInAdvance),
            "dinheiro" => Some(PledgeType::Money),
            _ => None,
        }
    }
}

impl fmt::Display for PledgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DonationKind {
    #[serde(rename = "dinheiro")]
    Money,
    #[serde(rename = "alimento")]
    InKind,
    #[serde(rename = "outro")]
    Other,
}

impl DonationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationKind::Money => "dinheiro",
            DonationKind::InKind => "alimento",
            DonationKind::Other => "outro",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "dinheiro" => Some(DonationKind::Money),
            "alimento" => Some(DonationKind::InKind),
            "outro" => Some(DonationKind::Other),
            _ => None,
        }
    }
}

impl fmt::Display for DonationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Publication status of a scheduled session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    #[serde(rename = "agendado")]
    Scheduled,
    /// The session has a date but no confirmed location yet
    #[serde(rename = "pendente")]
    PendingLocation,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Scheduled => "agendado",
            SessionStatus::PendingLocation => "pendente",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "agendado" => Some(SessionStatus::Scheduled),
            "pendente" => Some(SessionStatus::PendingLocation),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledSession {
    pub id: String,
    pub title: String,
    pub subject_id: String,
    pub subject_name: Option<String>,
    pub teacher_id: Option<String>,
    pub teacher_name: Option<String>,
    pub date: NaiveDate,
    /// "HH:MM"
    pub start_time: String,
    /// "HH:MM"
    pub end_time: String,
    pub location: String,
    pub max_participants: u32,
    pub topics: Vec<String>,
    pub materials_needed: Option<String>,
    /// Effective status: pending whenever the location is still undefined
    pub status: SessionStatus,
    pub file_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionListResponse {
    pub sessions: Vec<ScheduledSession>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub title: String,
    pub subject_id: String,
    pub teacher_id: Option<String>,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    /// Blank means "to be defined"
    #[serde(default)]
    pub location: String,
    pub max_participants: Option<u32>,
    /// Comma separated list, e.g. "limites, derivadas"
    #[serde(default)]
    pub topics: String,
    pub materials_needed: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateSessionRequest {
    pub title: String,
    pub subject_id: String,
    pub teacher_id: Option<String>,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub location: String,
    pub max_participants: Option<u32>,
    #[serde(default)]
    pub topics: String,
    pub materials_needed: Option<String>,
    pub status: Option<SessionStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session: ScheduledSession,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDeletionResponse {
    pub session_id: String,
    /// Steps executed by this call, in order
    pub executed_steps: Vec<String>,
    /// True when the call picked up a previously interrupted deletion
    pub resumed: bool,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifyParticipantsResponse {
    pub message: String,
    pub success_count: u32,
    pub error_count: u32,
}

// ---------------------------------------------------------------------------
// Registrations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub id: String,
    pub session_id: String,
    pub student_name: String,
    pub student_email: String,
    pub student_phone: Option<String>,
    pub student_registration_number: String,
    pub pledge_type: Option<PledgeType>,
    pub pledge_amount: Option<String>,
    pub confirmed_presence: bool,
    pub attended: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRegistrationRequest {
    pub student_name: String,
    pub student_email: String,
    pub student_phone: Option<String>,
    pub student_registration_number: String,
    pub pledge_type: Option<PledgeType>,
    pub pledge_amount: Option<String>,
    /// Name of the payment proof file, recorded for advance payments
    pub payment_proof_file_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationResponse {
    pub registration: Registration,
    pub success_message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrationCounters {
    pub total: u32,
    pub confirmed: u32,
    pub attended: u32,
    pub food_pledges: u32,
    pub monetary_pledges: u32,
    pub without_pledge: u32,
}

/// Query string of the admin registration listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrationListQuery {
    pub session_id: Option<String>,
    pub search: Option<String>,
    /// `all`, `confirmed`, `pending` or `attended`
    pub status: Option<String>,
    /// `all`, `none` or a pledge spelling
    pub pledge: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationListResponse {
    pub registrations: Vec<Registration>,
    pub counters: RegistrationCounters,
}

/// Payment recorded at sign-up for an advance monetary pledge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentDetail {
    pub id: String,
    pub registration_id: String,
    pub payment_type: String,
    pub amount: Option<f64>,
    pub proof_file_name: Option<String>,
    pub payment_date: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentDetailListResponse {
    pub payment_details: Vec<PaymentDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetAttendanceRequest {
    pub attended: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmPresenceRequest {
    pub confirmed: bool,
}

/// What happened to the donation ledger after an attendance change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LedgerStatus {
    NotApplicable,
    Recorded { donation_id: String },
    /// `donation_id` is absent when the existing entry could not be looked up
    AlreadyRecorded { donation_id: Option<String> },
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceResponse {
    pub registration: Registration,
    pub ledger: LedgerStatus,
    /// Present when the attendance change succeeded but the ledger step did not
    pub warning: Option<String>,
    pub success_message: String,
}

// ---------------------------------------------------------------------------
// Donations and finance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donation {
    pub id: String,
    pub session_id: Option<String>,
    pub registration_id: Option<String>,
    pub kind: DonationKind,
    pub amount: Option<f64>,
    pub food_weight_kg: Option<f64>,
    pub description: Option<String>,
    pub institution: Option<String>,
    pub donation_date: NaiveDate,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationListResponse {
    pub donations: Vec<Donation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateDonationRequest {
    pub kind: DonationKind,
    pub session_id: Option<String>,
    pub amount: Option<f64>,
    pub food_weight_kg: Option<f64>,
    pub description: Option<String>,
    pub institution: Option<String>,
    /// Defaults to today
    pub donation_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDonationTotal {
    pub session_id: Option<String>,
    pub session_title: String,
    pub session_date: Option<NaiveDate>,
    pub money_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinanceSummary {
    pub total_money_donations: f64,
    pub donations_by_session: Vec<SessionDonationTotal>,
    pub sessions_with_donations: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransparencyQuery {
    /// Defaults to the current year
    pub year: Option<i32>,
}

/// Ledger entry as shown to the public, without the registration link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicDonation {
    pub kind: DonationKind,
    pub amount: Option<f64>,
    pub food_weight_kg: Option<f64>,
    pub description: Option<String>,
    pub institution: Option<String>,
    pub donation_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransparencyReportResponse {
    pub year: i32,
    pub available_years: Vec<i32>,
    pub total_money: f64,
    pub total_food_kg: f64,
    pub institutions_helped: u32,
    pub sessions_held: u32,
    pub donations: Vec<PublicDonation>,
}

// ---------------------------------------------------------------------------
// Catalog, statistics and instructor applications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_scheduled: bool,
    pub is_seeking_teachers: bool,
}

/// Reminder email template; placeholders such as `{TITULO_AULAO}` are
/// filled in per session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailTemplate {
    pub subject: String,
    pub body: String,
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSubjectRequest {
    /// Derived from the name when absent
    pub id: Option<String>,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectListResponse {
    pub subjects: Vec<Subject>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformStatistics {
    pub year: i32,
    pub total_classes: u32,
    pub total_students: u32,
    /// Food collected since the platform started
    pub total_food_kg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherApplicationResponse {
    pub id: String,
    pub status: String,
    pub success_message: String,
}

// ---------------------------------------------------------------------------
// Administrators
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Administrator {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub email: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdministratorListResponse {
    pub administrators: Vec<Administrator>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAdministratorRequest {
    pub username: String,
    pub full_name: String,
    pub email: Option<String>,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateAdministratorRequest {
    pub username: String,
    pub full_name: String,
    pub email: Option<String>,
    /// Only replaced when present and non-empty
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub administrator: Administrator,
}

/// Body of every non-2xx JSON response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pledge_type_wire_spelling() {
        let json = serde_json::to_string(&PledgeType::PayInAdvance).unwrap();
        assert_eq!(json, "\"pagamento_antecipado\"");

        let parsed: PledgeType = serde_json::from_str("\"pagamento_hora\"").unwrap();
        assert_eq!(parsed, PledgeType::PayAtEvent);
        assert_eq!(PledgeType::parse(" alimento "), Some(PledgeType::Food));
        assert_eq!(PledgeType::parse("pix"), None);
    }

    #[test]
    fn test_ledger_status_is_tagged() {
        let json = serde_json::to_value(LedgerStatus::Recorded {
            donation_id: "d1".to_string(),
        })
        .unwrap();
        assert_eq!(json["status"], "recorded");
        assert_eq!(json["donation_id"], "d1");

        let json = serde_json::to_value(LedgerStatus::AlreadyRecorded {
            donation_id: Some("d1".to_string()),
        })
        .unwrap();
        assert_eq!(json["status"], "already_recorded");
        assert_eq!(json["donation_id"], "d1");
    }

    #[test]
    fn test_donation_kind_round_trips_legacy_spelling() {
        assert_eq!(DonationKind::parse("dinheiro"), Some(DonationKind::Money));
        assert_eq!(DonationKind::Money.to_string(), "dinheiro");
    }
}
