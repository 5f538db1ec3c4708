use serde::{Deserialize, Serialize};
use shared::PledgeType;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Registration {
    pub id: String,
    pub session_id: String,
    pub student_name: String,
    pub student_email: String,
    pub student_phone: Option<String>,
    pub student_registration_number: String,
    pub pledge_type: Option<PledgeType>,
    /// Free text as typed by the student, e.g. "3.00"
    pub pledge_amount: Option<String>,
    pub confirmed_presence: bool,
    pub attended: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Registration {
    /// True for pledges that must end up as a money entry in the ledger
    pub fn has_monetary_pledge(&self) -> bool {
        self.pledge_type.map(is_monetary).unwrap_or(false)
    }

    pub fn parsed_pledge_amount(&self) -> Option<f64> {
        parse_pledge_amount(self.pledge_amount.as_deref())
    }
}

pub fn is_monetary(pledge: PledgeType) -> bool {
    matches!(
        pledge,
        PledgeType::PayAtEvent | PledgeType::PayInAdvance | PledgeType::Money
    )
}

/// Lenient numeric parse used by the ledger: anything that is not a finite
/// number becomes `None` instead of an error.
pub fn parse_pledge_amount(raw: Option<&str>) -> Option<f64> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Payment information attached to an advance-payment registration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentDetail {
    pub id: String,
    pub registration_id: String,
    pub payment_type: String,
    pub amount: Option<f64>,
    pub proof_file_name: Option<String>,
    pub payment_date: String,
    pub status: String,
    pub created_at: String,
}

impl PaymentDetail {
    pub const ADVANCE_PAYMENT_TYPE: &'static str = "dinheiro_antecipado";
    pub const PENDING_STATUS: &'static str = "pending";
}
