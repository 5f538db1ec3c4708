//! Reconciliation between registrations, attendance and the donation ledger.
//!
//! Marking a registration as attended turns a monetary pledge into a money
//! entry in the ledger, at most once per registration. Ledger entries are
//! never removed by this service: un-marking attendance, deleting a
//! registration or deleting a whole session leaves them in place (a deleted
//! session only unlinks them).

use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::commands::reconciliation::{AttendanceOutcome, LedgerOutcome, SessionDeletionReport};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::models::deletion::{SessionDeletion, SessionDeletionStep};
use crate::domain::models::donation::Donation;
use crate::domain::models::registration::Registration;
use crate::storage::traits::{
    Connection, DeletionStorage, DonationStorage, PaymentDetailStorage, RegistrationStorage,
    SessionStorage,
};

#[derive(Clone)]
pub struct ReconciliationService<C: Connection> {
    registration_repository: C::RegistrationRepository,
    payment_detail_repository: C::PaymentDetailRepository,
    donation_repository: C::DonationRepository,
    session_repository: C::SessionRepository,
    deletion_repository: C::DeletionRepository,
}

impl<C: Connection> ReconciliationService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            registration_repository: connection.create_registration_repository(),
            payment_detail_repository: connection.create_payment_detail_repository(),
            donation_repository: connection.create_donation_repository(),
            session_repository: connection.create_session_repository(),
            deletion_repository: connection.create_deletion_repository(),
        }
    }

    /// Mark or un-mark attendance.
    ///
    /// `confirmed_presence` always follows `attended`. When attendance is
    /// marked on a monetary pledge a money donation is recorded unless one
    /// already exists. A failing ledger insert does not fail the call; it is
    /// reported through [`LedgerOutcome::Failed`].
    pub async fn set_attendance(&self, registration_id: &str, attended: bool) -> DomainResult<AttendanceOutcome> {
        info!("Setting attendance for registration {} to {}", registration_id, attended);

        let mut registration = self.load_registration(registration_id).await?;

        let now = Utc::now();
        let updated_at = now.to_rfc3339();
        let updated = self
            .registration_repository
            .update_attendance(registration_id, attended, &updated_at)
            .await?;
        if !updated {
            return Err(DomainError::not_found(format!("Registration {}", registration_id)));
        }

        registration.attended = attended;
        registration.confirmed_presence = attended;
        registration.updated_at = updated_at.clone();

        if !attended || !registration.has_monetary_pledge() {
            return Ok(AttendanceOutcome {
                registration,
                ledger: LedgerOutcome::NotApplicable,
            });
        }

        let donation = Donation::money_for_registration(&registration, now.date_naive(), updated_at);
        let ledger = match self.donation_repository.insert_money_donation_if_absent(&donation).await {
            Ok(true) => {
                info!(
                    "Recorded donation {} for registration {} (amount {:?})",
                    donation.id, registration_id, donation.amount
                );
                LedgerOutcome::Recorded { donation_id: donation.id }
            }
            Ok(false) => {
                let existing = match self
                    .donation_repository
                    .find_money_donation_for_registration(registration_id)
                    .await
                {
                    Ok(existing) => existing.map(|d| d.id),
                    Err(e) => {
                        warn!("Could not read back the donation of registration {}: {:#}", registration_id, e);
                        None
                    }
                };
                info!("Donation {:?} already recorded for registration {}", existing, registration_id);
                LedgerOutcome::AlreadyRecorded { donation_id: existing }
            }
            Err(e) => {
                warn!("Attendance saved but donation insert failed for registration {}: {:#}", registration_id, e);
                LedgerOutcome::Failed {
                    warning: format!("Attendance was saved but the donation could not be recorded: {:#}", e),
                }
            }
        };

        Ok(AttendanceOutcome { registration, ledger })
    }

    /// Toggle the "confirmed presence" flag without touching attendance
    pub async fn confirm_presence(&self, registration_id: &str, confirmed: bool) -> DomainResult<Registration> {
        info!("Setting confirmed presence for registration {} to {}", registration_id, confirmed);

        let mut registration = self.load_registration(registration_id).await?;
        if !confirmed && registration.attended {
            return Err(DomainError::validation(
                "Cannot remove presence confirmation from a registration marked as attended",
            ));
        }

        let updated_at = Utc::now().to_rfc3339();
        let updated = self
            .registration_repository
            .update_confirmed_presence(registration_id, confirmed, &updated_at)
            .await?;
        if !updated {
            return Err(DomainError::not_found(format!("Registration {}", registration_id)));
        }

        registration.confirmed_presence = confirmed;
        registration.updated_at = updated_at;
        Ok(registration)
    }

    /// Delete a registration and its payment details; donations are kept
    pub async fn delete_registration(&self, registration_id: &str) -> DomainResult<()> {
        info!("Deleting registration {}", registration_id);

        self.load_registration(registration_id).await?;

        let removed_details = self
            .payment_detail_repository
            .delete_payment_details_for_registrations(&[registration_id.to_string()])
            .await?;
        let deleted = self.registration_repository.delete_registration(registration_id).await?;
        if !deleted {
            return Err(DomainError::not_found(format!("Registration {}", registration_id)));
        }

        info!(
            "Deleted registration {} ({} payment detail(s) removed)",
            registration_id, removed_details
        );
        Ok(())
    }

    /// Delete a session and everything hanging off it, except donations.
    ///
    /// Progress is recorded after every step. When a step fails the error
    /// names it and a later call picks up right after the last recorded step.
    pub async fn delete_session(&self, session_id: &str) -> DomainResult<SessionDeletionReport> {
        let pending = self.deletion_repository.get_session_deletion(session_id).await?;
        let resumed = pending.is_some();

        let mut record = match pending {
            Some(record) => {
                info!(
                    "Resuming deletion of session {} after {:?}",
                    session_id, record.completed_step
                );
                record
            }
            None => {
                if self.session_repository.get_session(session_id).await?.is_none() {
                    return Err(DomainError::not_found(format!("Session {}", session_id)));
                }
                info!("Deleting session {}", session_id);
                SessionDeletion {
                    session_id: session_id.to_string(),
                    registration_ids: Vec::new(),
                    completed_step: None,
                    updated_at: Utc::now().to_rfc3339(),
                }
            }
        };

        let mut executed_steps = Vec::new();
        for step in SessionDeletionStep::remaining_after(record.completed_step) {
            if let Err(e) = self.run_step(step, &mut record).await {
                warn!("Deletion of session {} failed at {}: {:#}", session_id, step, e);
                return Err(DomainError::DeletionStepFailed {
                    step,
                    message: format!("{:#}", e),
                });
            }
            executed_steps.push(step);

            if step.next().is_some() {
                record.completed_step = Some(step);
                record.updated_at = Utc::now().to_rfc3339();
                if let Err(e) = self.deletion_repository.save_session_deletion(&record).await {
                    // Steps are idempotent, so a lost record only means repeating this one
                    return Err(DomainError::DeletionStepFailed {
                        step,
                        message: format!("failed to record progress: {:#}", e),
                    });
                }
            }
        }

        self.deletion_repository.clear_session_deletion(session_id).await?;
        info!("Deleted session {} ({} step(s) run)", session_id, executed_steps.len());

        Ok(SessionDeletionReport {
            session_id: session_id.to_string(),
            executed_steps,
            resumed,
        })
    }

    async fn run_step(&self, step: SessionDeletionStep, record: &mut SessionDeletion) -> anyhow::Result<()> {
        let session_id = record.session_id.as_str();
        match step {
            SessionDeletionStep::CollectRegistrations => {
                record.registration_ids = self
                    .registration_repository
                    .list_registration_ids_for_session(session_id)
                    .await
                    .context("collecting registrations")?;
            }
            SessionDeletionStep::DeletePaymentDetails => {
                self.payment_detail_repository
                    .delete_payment_details_for_registrations(&record.registration_ids)
                    .await
                    .context("deleting payment details")?;
            }
            SessionDeletionStep::UnlinkDonations => {
                let unlinked = self
                    .donation_repository
                    .unlink_session(session_id)
                    .await
                    .context("unlinking donations")?;
                info!("Unlinked {} donation(s) from session {}", unlinked, session_id);
            }
            SessionDeletionStep::DeleteRegistrations => {
                // Registrations created after the collect step still carry payment details
                let current = self
                    .registration_repository
                    .list_registration_ids_for_session(session_id)
                    .await
                    .context("collecting late registrations")?;
                let late: Vec<String> = current
                    .into_iter()
                    .filter(|id| !record.registration_ids.contains(id))
                    .collect();
                if !late.is_empty() {
                    self.payment_detail_repository
                        .delete_payment_details_for_registrations(&late)
                        .await
                        .context("deleting payment details of late registrations")?;
                }
                self.registration_repository
                    .delete_registrations_for_session(session_id)
                    .await
                    .context("deleting registrations")?;
            }
            SessionDeletionStep::DeleteSession => {
                self.session_repository
                    .delete_session(session_id)
                    .await
                    .context("deleting session")?;
            }
        }
        Ok(())
    }

    async fn load_registration(&self, registration_id: &str) -> DomainResult<Registration> {
        self.registration_repository
            .get_registration(registration_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Registration {}", registration_id)))
    }
}
