use shared::{
    AttendanceResponse, CreateRegistrationRequest, LedgerStatus, PaymentDetail as SharedPaymentDetail,
    Registration as SharedRegistration, RegistrationListQuery,
};

use crate::domain::commands::reconciliation::{AttendanceOutcome, LedgerOutcome};
use crate::domain::commands::registration::{PledgeFilter, PresenceFilter, RegisterCommand, RegistrationFilter};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::models::registration::{PaymentDetail, Registration};

pub struct RegistrationMapper;

impl RegistrationMapper {
    pub fn payment_detail_to_dto(domain: PaymentDetail) -> SharedPaymentDetail {
        SharedPaymentDetail {
            id: domain.id,
            registration_id: domain.registration_id,
            payment_type: domain.payment_type,
            amount: domain.amount,
            proof_file_name: domain.proof_file_name,
            payment_date: domain.payment_date,
            status: domain.status,
        }
    }

    pub fn to_dto(domain: Registration) -> SharedRegistration {
        SharedRegistration {
            id: domain.id,
            session_id: domain.session_id,
            student_name: domain.student_name,
            student_email: domain.student_email,
            student_phone: domain.student_phone,
            student_registration_number: domain.student_registration_number,
            pledge_type: domain.pledge_type,
            pledge_amount: domain.pledge_amount,
            confirmed_presence: domain.confirmed_presence,
            attended: domain.attended,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }

    pub fn to_dto_list(registrations: Vec<Registration>) -> Vec<SharedRegistration> {
        registrations.into_iter().map(Self::to_dto).collect()
    }

    pub fn to_register_command(session_id: String, request: CreateRegistrationRequest) -> RegisterCommand {
        RegisterCommand {
            session_id,
            student_name: request.student_name,
            student_email: request.student_email,
            student_phone: request.student_phone,
            student_registration_number: request.student_registration_number,
            pledge_type: request.pledge_type,
            pledge_amount: request.pledge_amount,
            payment_proof_file_name: request.payment_proof_file_name,
        }
    }

    /// Unknown filter values are rejected rather than ignored
    pub fn to_filter(query: RegistrationListQuery) -> DomainResult<RegistrationFilter> {
        let presence = match query.status.as_deref() {
            Some(value) => PresenceFilter::parse(value)
                .ok_or_else(|| DomainError::validation(format!("Unknown status filter '{}'", value)))?,
            None => PresenceFilter::All,
        };
        let pledge = match query.pledge.as_deref() {
            Some(value) => PledgeFilter::parse(value)
                .ok_or_else(|| DomainError::validation(format!("Unknown pledge filter '{}'", value)))?,
            None => PledgeFilter::All,
        };
        Ok(RegistrationFilter {
            session_id: query.session_id.filter(|id| !id.trim().is_empty()),
            search: query.search,
            presence,
            pledge,
        })
    }

    pub fn to_attendance_response(outcome: AttendanceOutcome) -> AttendanceResponse {
        let (ledger, warning) = match outcome.ledger {
            LedgerOutcome::NotApplicable => (LedgerStatus::NotApplicable, None),
            LedgerOutcome::Recorded { donation_id } => (LedgerStatus::Recorded { donation_id }, None),
            LedgerOutcome::AlreadyRecorded { donation_id } => (LedgerStatus::AlreadyRecorded { donation_id }, None),
            LedgerOutcome::Failed { warning } => (LedgerStatus::Failed, Some(warning)),
        };
        let success_message = if outcome.registration.attended {
            "Attendance recorded".to_string()
        } else {
            "Attendance removed".to_string()
        };
        AttendanceResponse {
            registration: Self::to_dto(outcome.registration),
            ledger,
            warning,
            success_message,
        }
    }
}
