//! Payment Records

use jiff::Timestamp;
use smallvec::SmallVec;

use crate::domain::appointments::records::{AppointmentRecord, AppointmentUuid, CustomerUuid};

/// Appointment ids paid together; most checkouts cover one or two bookings.
pub type AppointmentUuids = SmallVec<[AppointmentUuid; 4]>;

/// A hosted checkout opened for a set of appointments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSessionRecord {
    /// Provider session id.
    pub provider_reference: String,
    pub customer_uuid: CustomerUuid,
    pub appointment_uuids: AppointmentUuids,
    /// Total in minor currency units.
    pub amount: u64,
    pub currency: String,
    pub checkout_url: String,
    pub created_at: Timestamp,
    /// Set once, when the payment is reconciled.
    pub completed_at: Option<Timestamp>,
}

impl CheckoutSessionRecord {
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Whether the session pays for exactly the sorted, deduplicated `appointments`.
    #[must_use]
    pub fn covers_exactly(&self, appointments: &[AppointmentUuid]) -> bool {
        let mut covered = self.appointment_uuids.clone();

        covered.sort_unstable();
        covered.dedup();

        covered.as_slice() == appointments
    }
}

/// Redirect handle returned to the customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutIntent {
    pub id: String,
    pub url: String,
}

/// Result of applying a provider confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationOutcome {
    /// Appointments marked paid by this confirmation, and those left alone
    /// because they were already paid or cancelled.
    Reconciled {
        updated: AppointmentUuids,
        skipped: AppointmentUuids,
    },
    /// The session was already reconciled.
    Duplicate,
    /// No session with that reference was ever opened here.
    Unknown,
}

/// What the success page learns about a checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutVerification {
    pub paid: bool,
    pub appointments: Vec<AppointmentRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Processed(ReconciliationOutcome),
    Ignored { event_type: String },
}
