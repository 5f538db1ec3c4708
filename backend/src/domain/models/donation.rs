use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::DonationKind;

use super::registration::Registration;

/// Append-only ledger entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Donation {
    pub id: String,
    /// Nulled when the originating session is deleted
    pub session_id: Option<String>,
    /// Back-reference only; may point at a deleted registration
    pub registration_id: Option<String>,
    pub kind: DonationKind,
    pub amount: Option<f64>,
    pub food_weight_kg: Option<f64>,
    pub description: Option<String>,
    /// Institution the goods or money were handed to
    pub institution: Option<String>,
    pub donation_date: NaiveDate,
    pub created_at: String,
}

impl Donation {
    /// Ledger entry produced when a monetary pledge is honoured
    pub fn money_for_registration(
        registration: &Registration,
        donation_date: NaiveDate,
        created_at: String,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: Some(registration.session_id.clone()),
            registration_id: Some(registration.id.clone()),
            kind: DonationKind::Money,
            amount: registration.parsed_pledge_amount(),
            food_weight_kg: None,
            description: None,
            institution: None,
            donation_date,
            created_at,
        }
    }
}
