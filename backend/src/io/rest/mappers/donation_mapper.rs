use shared::{
    CreateDonationRequest, Donation as SharedDonation, FinanceSummary, PublicDonation, SessionDonationTotal,
    TransparencyReportResponse,
};

use crate::domain::commands::finance::{FinanceSummaryResult, ManualDonationCommand, TransparencyReport};
use crate::domain::models::donation::Donation;

pub struct DonationMapper;

impl DonationMapper {
    pub fn to_dto(domain: Donation) -> SharedDonation {
        SharedDonation {
            id: domain.id,
            session_id: domain.session_id,
            registration_id: domain.registration_id,
            kind: domain.kind,
            amount: domain.amount,
            food_weight_kg: domain.food_weight_kg,
            description: domain.description,
            institution: domain.institution,
            donation_date: domain.donation_date,
            created_at: domain.created_at,
        }
    }

    pub fn to_dto_list(donations: Vec<Donation>) -> Vec<SharedDonation> {
        donations.into_iter().map(Self::to_dto).collect()
    }

    pub fn to_command(request: CreateDonationRequest) -> ManualDonationCommand {
        ManualDonationCommand {
            kind: request.kind,
            session_id: request.session_id,
            amount: request.amount,
            food_weight_kg: request.food_weight_kg,
            description: request.description,
            institution: request.institution,
            donation_date: request.donation_date,
        }
    }

    pub fn to_summary_dto(result: FinanceSummaryResult) -> FinanceSummary {
        FinanceSummary {
            total_money_donations: result.total_money,
            donations_by_session: result
                .by_session
                .into_iter()
                .map(|total| SessionDonationTotal {
                    session_id: total.session_id,
                    session_title: total.session_title,
                    session_date: total.session_date,
                    money_amount: total.money_amount,
                })
                .collect(),
            sessions_with_donations: result.sessions_with_donations,
        }
    }

    pub fn to_transparency_dto(report: TransparencyReport) -> TransparencyReportResponse {
        TransparencyReportResponse {
            year: report.year,
            available_years: report.available_years,
            total_money: report.total_money,
            total_food_kg: report.total_food_kg,
            institutions_helped: report.institutions,
            sessions_held: report.sessions_held,
            donations: report
                .donations
                .into_iter()
                .map(|donation| PublicDonation {
                    kind: donation.kind,
                    amount: donation.amount,
                    food_weight_kg: donation.food_weight_kg,
                    description: donation.description,
                    institution: donation.institution,
                    donation_date: donation.donation_date,
                })
                .collect(),
        }
    }
}
