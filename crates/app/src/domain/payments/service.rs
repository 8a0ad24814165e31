//! Payments service.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::{Span, info, warn};

use crate::{
    auth::Actor,
    database::Db,
    domain::{
        appointments::records::{AppointmentRecord, PaymentMethod},
        payments::{
            errors::PaymentsServiceError,
            provider::{CheckoutRequest, LineItem, PaymentProvider, ProviderError},
            records::{
                AppointmentUuids, CheckoutIntent, CheckoutSessionRecord, CheckoutVerification,
                ReconciliationOutcome, WebhookOutcome,
            },
            repository::PgPaymentsRepository,
            webhook::{parse_event, verify_signature},
        },
    },
};

/// Settings shared by card checkout and webhook handling.
#[derive(Clone)]
pub struct PaymentSettings {
    /// Lowercase ISO currency code charged by every checkout session.
    pub currency: String,

    /// Webhook endpoint signing secret.
    pub webhook_secret: String,
}

impl Debug for PaymentSettings {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("PaymentSettings")
            .field("currency", &self.currency)
            .field("webhook_secret", &"**redacted**")
            .finish()
    }
}

pub struct PgPaymentsService {
    db: Db,
    repository: PgPaymentsRepository,
    provider: Arc<dyn PaymentProvider>,
    settings: PaymentSettings,
}

impl Debug for PgPaymentsService {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("PgPaymentsService")
            .field("db", &self.db)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl PgPaymentsService {
    #[must_use]
    pub fn new(db: Db, provider: Arc<dyn PaymentProvider>, settings: PaymentSettings) -> Self {
        Self {
            db,
            repository: PgPaymentsRepository::new(),
            provider,
            settings,
        }
    }
}

fn normalize(mut appointments: AppointmentUuids) -> Result<AppointmentUuids, PaymentsServiceError> {
    if appointments.is_empty() {
        return Err(PaymentsServiceError::Validation(
            "at least one appointment id is required",
        ));
    }

    appointments.sort_unstable();
    appointments.dedup();

    Ok(appointments)
}

#[async_trait]
impl PaymentsService for PgPaymentsService {
    async fn list_unpaid(
        &self,
        actor: &Actor,
    ) -> Result<Vec<AppointmentRecord>, PaymentsServiceError> {
        let mut tx = self.db.begin().await?;

        let appointments = self
            .repository
            .list_unpaid_appointments(&mut tx, actor.uuid)
            .await?;

        tx.commit().await?;

        Ok(appointments)
    }

    #[tracing::instrument(
        name = "payments.service.confirm_cash_payment",
        skip(self, actor, appointments),
        fields(customer_uuid = %actor.uuid, requested = appointments.len()),
        err
    )]
    async fn confirm_cash_payment(
        &self,
        actor: &Actor,
        appointments: AppointmentUuids,
    ) -> Result<u64, PaymentsServiceError> {
        let appointments = normalize(appointments)?;

        let mut tx = self.db.begin().await?;

        let updated = self
            .repository
            .mark_paid(&mut tx, actor.uuid, &appointments, PaymentMethod::Cash)
            .await?;

        tx.commit().await?;

        info!(updated = updated.len(), "confirmed cash payment");

        Ok(updated.len() as u64)
    }

    #[tracing::instrument(
        name = "payments.service.create_checkout_intent",
        skip(self, actor, appointments),
        fields(
            customer_uuid = %actor.uuid,
            requested = appointments.len(),
            amount = tracing::field::Empty,
            provider_reference = tracing::field::Empty
        ),
        err
    )]
    async fn create_checkout_intent(
        &self,
        actor: &Actor,
        appointments: AppointmentUuids,
    ) -> Result<CheckoutIntent, PaymentsServiceError> {
        let appointments = normalize(appointments)?;

        // Row locks serialize concurrent checkouts for the same appointments
        // until the new session is stored.
        let mut tx = self.db.begin().await?;

        let records = self
            .repository
            .lock_customer_appointments(&mut tx, actor.uuid, &appointments)
            .await?;

        if records.len() != appointments.len() {
            return Err(PaymentsServiceError::NotFound);
        }

        if !records.iter().all(AppointmentRecord::is_payable) {
            return Err(PaymentsServiceError::NotPayable);
        }

        let open = self
            .repository
            .list_open_checkout_sessions(&mut tx, &appointments)
            .await?;

        if let Some(existing) = open
            .iter()
            .find(|session| session.covers_exactly(&appointments))
        {
            tx.commit().await?;

            Span::current().record("provider_reference", existing.provider_reference.as_str());

            info!(
                provider_reference = %existing.provider_reference,
                "reused open checkout session"
            );

            return Ok(CheckoutIntent {
                id: existing.provider_reference.clone(),
                url: existing.checkout_url.clone(),
            });
        }

        if !open.is_empty() {
            warn!(
                open_sessions = open.len(),
                "appointments are already part of another open checkout"
            );

            return Err(PaymentsServiceError::NotPayable);
        }

        let amount = records
            .iter()
            .try_fold(0_u64, |total, record| total.checked_add(record.price))
            .ok_or(PaymentsServiceError::Validation("checkout total is too large"))?;

        let span = Span::current();

        span.record("amount", amount);

        let session = self
            .provider
            .create_checkout_session(CheckoutRequest {
                customer_email: actor.email.clone(),
                currency: self.settings.currency.clone(),
                line_items: records
                    .iter()
                    .map(|record| LineItem {
                        name: format!(
                            "{} ({} {})",
                            record.service_name, record.date, record.time_slot
                        ),
                        unit_amount: record.price,
                    })
                    .collect(),
                appointment_uuids: appointments.clone(),
            })
            .await?;

        span.record("provider_reference", session.id.as_str());

        let url = session.url.ok_or_else(|| {
            ProviderError::UnexpectedResponse(
                "checkout session has no url".to_string(),
            )
        })?;

        let created = self
            .repository
            .create_checkout_session(
                &mut tx,
                &CheckoutSessionRecord {
                    provider_reference: session.id,
                    customer_uuid: actor.uuid,
                    appointment_uuids: appointments,
                    amount,
                    currency: self.settings.currency.clone(),
                    checkout_url: url,
                    created_at: Timestamp::now(),
                    completed_at: None,
                },
            )
            .await?;

        tx.commit().await?;

        info!(
            provider_reference = %created.provider_reference,
            amount,
            "opened checkout session"
        );

        Ok(CheckoutIntent {
            id: created.provider_reference,
            url: created.checkout_url,
        })
    }

    #[tracing::instrument(
        name = "payments.service.confirm_checkout",
        skip(self),
        fields(outcome = tracing::field::Empty),
        err
    )]
    async fn confirm_checkout(
        &self,
        provider_reference: &str,
    ) -> Result<ReconciliationOutcome, PaymentsServiceError> {
        let mut tx = self.db.begin().await?;

        let Some(session) = self
            .repository
            .lock_checkout_session(&mut tx, provider_reference)
            .await?
        else {
            Span::current().record("outcome", "unknown");

            warn!(provider_reference, "confirmation for unknown checkout session");

            return Ok(ReconciliationOutcome::Unknown);
        };

        if session.is_completed() {
            Span::current().record("outcome", "duplicate");

            info!(provider_reference, "checkout session already reconciled");

            return Ok(ReconciliationOutcome::Duplicate);
        }

        let updated = self
            .repository
            .mark_paid(
                &mut tx,
                session.customer_uuid,
                &session.appointment_uuids,
                PaymentMethod::Card,
            )
            .await?;

        let skipped: AppointmentUuids = session
            .appointment_uuids
            .iter()
            .filter(|uuid| !updated.contains(uuid))
            .copied()
            .collect();

        if !skipped.is_empty() {
            warn!(
                provider_reference,
                skipped = ?skipped,
                "skipped appointments that were already paid or cancelled"
            );
        }

        self.repository
            .complete_checkout_session(&mut tx, provider_reference)
            .await?;

        tx.commit().await?;

        Span::current().record("outcome", "reconciled");

        info!(
            provider_reference,
            updated = updated.len(),
            skipped = skipped.len(),
            "reconciled card payment"
        );

        Ok(ReconciliationOutcome::Reconciled { updated, skipped })
    }

    async fn verify_checkout(
        &self,
        actor: &Actor,
        provider_reference: &str,
    ) -> Result<CheckoutVerification, PaymentsServiceError> {
        let mut tx = self.db.begin().await?;

        let session = self
            .repository
            .get_checkout_session(&mut tx, provider_reference)
            .await?
            .filter(|session| session.customer_uuid == actor.uuid)
            .ok_or(PaymentsServiceError::NotFound)?;

        tx.commit().await?;

        let remote = self
            .provider
            .retrieve_checkout_session(provider_reference)
            .await?;

        if remote.is_paid() {
            self.confirm_checkout(provider_reference).await?;
        }

        let mut tx = self.db.begin().await?;

        let appointments = self
            .repository
            .list_customer_appointments(&mut tx, actor.uuid, &session.appointment_uuids)
            .await?;

        tx.commit().await?;

        Ok(CheckoutVerification {
            paid: remote.is_paid(),
            appointments,
        })
    }

    async fn handle_webhook(
        &self,
        payload: &[u8],
        signature: &str,
        now: Timestamp,
    ) -> Result<WebhookOutcome, PaymentsServiceError> {
        verify_signature(payload, signature, self.settings.webhook_secret.as_bytes(), now)?;

        let event = parse_event(payload)?;

        let Some(reference) = event.paid_checkout_session() else {
            info!(event_id = %event.id, event_type = %event.event_type, "ignored webhook event");

            return Ok(WebhookOutcome::Ignored {
                event_type: event.event_type,
            });
        };

        let outcome = self.confirm_checkout(reference).await?;

        Ok(WebhookOutcome::Processed(outcome))
    }
}

#[automock]
#[async_trait]
pub trait PaymentsService: Send + Sync {
    /// The actor's unpaid, live appointments ordered by date and slot.
    async fn list_unpaid(&self, actor: &Actor)
    -> Result<Vec<AppointmentRecord>, PaymentsServiceError>;

    /// Mark the actor's unpaid, live appointments among `appointments` as paid
    /// in cash. Returns how many changed.
    async fn confirm_cash_payment(
        &self,
        actor: &Actor,
        appointments: AppointmentUuids,
    ) -> Result<u64, PaymentsServiceError>;

    /// Open a hosted card checkout for the actor's appointments.
    async fn create_checkout_intent(
        &self,
        actor: &Actor,
        appointments: AppointmentUuids,
    ) -> Result<CheckoutIntent, PaymentsServiceError>;

    /// Apply a provider confirmation. Safe to repeat.
    async fn confirm_checkout(
        &self,
        provider_reference: &str,
    ) -> Result<ReconciliationOutcome, PaymentsServiceError>;

    /// Ask the provider about a checkout and reconcile it if paid.
    async fn verify_checkout(
        &self,
        actor: &Actor,
        provider_reference: &str,
    ) -> Result<CheckoutVerification, PaymentsServiceError>;

    /// Verify and apply a signed provider event.
    async fn handle_webhook(
        &self,
        payload: &[u8],
        signature: &str,
        now: Timestamp,
    ) -> Result<WebhookOutcome, PaymentsServiceError>;
}
