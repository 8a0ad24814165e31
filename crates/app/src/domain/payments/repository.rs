//! Payments Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use tracing::debug;
use uuid::Uuid;

use crate::domain::{
    appointments::records::{AppointmentRecord, AppointmentUuid, CustomerUuid, PaymentMethod},
    payments::records::{AppointmentUuids, CheckoutSessionRecord},
};

const LIST_UNPAID_APPOINTMENTS_SQL: &str = include_str!("sql/list_unpaid_appointments.sql");
const LIST_CUSTOMER_APPOINTMENTS_BY_UUID_SQL: &str =
    include_str!("sql/list_customer_appointments_by_uuid.sql");
const LOCK_CUSTOMER_APPOINTMENTS_BY_UUID_SQL: &str =
    include_str!("sql/lock_customer_appointments_by_uuid.sql");
const MARK_APPOINTMENTS_PAID_SQL: &str = include_str!("sql/mark_appointments_paid.sql");
const CREATE_CHECKOUT_SESSION_SQL: &str = include_str!("sql/create_checkout_session.sql");
const GET_CHECKOUT_SESSION_SQL: &str = include_str!("sql/get_checkout_session.sql");
const LIST_OPEN_CHECKOUT_SESSIONS_SQL: &str = include_str!("sql/list_open_checkout_sessions.sql");
const LOCK_CHECKOUT_SESSION_SQL: &str = include_str!("sql/lock_checkout_session.sql");
const COMPLETE_CHECKOUT_SESSION_SQL: &str = include_str!("sql/complete_checkout_session.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgPaymentsRepository;

impl PgPaymentsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_unpaid_appointments(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: CustomerUuid,
    ) -> Result<Vec<AppointmentRecord>, sqlx::Error> {
        query_as::<Postgres, AppointmentRecord>(LIST_UNPAID_APPOINTMENTS_SQL)
            .bind(customer.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    /// The customer's appointments among `appointments`; others are silently absent.
    pub(crate) async fn list_customer_appointments(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: CustomerUuid,
        appointments: &[AppointmentUuid],
    ) -> Result<Vec<AppointmentRecord>, sqlx::Error> {
        query_as::<Postgres, AppointmentRecord>(LIST_CUSTOMER_APPOINTMENTS_BY_UUID_SQL)
            .bind(into_uuids(appointments))
            .bind(customer.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    /// Like [`Self::list_customer_appointments`], row-locking the matches until
    /// the transaction ends.
    pub(crate) async fn lock_customer_appointments(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: CustomerUuid,
        appointments: &[AppointmentUuid],
    ) -> Result<Vec<AppointmentRecord>, sqlx::Error> {
        query_as::<Postgres, AppointmentRecord>(LOCK_CUSTOMER_APPOINTMENTS_BY_UUID_SQL)
            .bind(into_uuids(appointments))
            .bind(customer.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    /// Unexpired, unreconciled sessions covering any of `appointments`, newest first.
    pub(crate) async fn list_open_checkout_sessions(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        appointments: &[AppointmentUuid],
    ) -> Result<Vec<CheckoutSessionRecord>, sqlx::Error> {
        query_as::<Postgres, CheckoutSessionRecord>(LIST_OPEN_CHECKOUT_SESSIONS_SQL)
            .bind(into_uuids(appointments))
            .fetch_all(&mut **tx)
            .await
    }

    /// Mark the customer's unpaid, live appointments as paid by `method`.
    ///
    /// Returns the appointments that changed.
    #[tracing::instrument(
        name = "payments.repository.mark_paid",
        skip(self, tx, appointments),
        fields(
            requested = appointments.len(),
            updated = tracing::field::Empty
        ),
        err
    )]
    pub(crate) async fn mark_paid(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: CustomerUuid,
        appointments: &[AppointmentUuid],
        method: PaymentMethod,
    ) -> Result<AppointmentUuids, sqlx::Error> {
        let updated: Vec<Uuid> = query_scalar(MARK_APPOINTMENTS_PAID_SQL)
            .bind(into_uuids(appointments))
            .bind(customer.into_uuid())
            .bind(method.as_str())
            .fetch_all(&mut **tx)
            .await?;

        tracing::Span::current().record("updated", updated.len());

        debug!(updated = updated.len(), method = %method, "marked appointments paid");

        Ok(updated.into_iter().map(AppointmentUuid::from_uuid).collect())
    }

    pub(crate) async fn create_checkout_session(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        session: &CheckoutSessionRecord,
    ) -> Result<CheckoutSessionRecord, sqlx::Error> {
        let amount = i64::try_from(session.amount).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        query_as::<Postgres, CheckoutSessionRecord>(CREATE_CHECKOUT_SESSION_SQL)
            .bind(&session.provider_reference)
            .bind(session.customer_uuid.into_uuid())
            .bind(into_uuids(&session.appointment_uuids))
            .bind(amount)
            .bind(&session.currency)
            .bind(&session.checkout_url)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_checkout_session(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        reference: &str,
    ) -> Result<Option<CheckoutSessionRecord>, sqlx::Error> {
        query_as::<Postgres, CheckoutSessionRecord>(GET_CHECKOUT_SESSION_SQL)
            .bind(reference)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Fetch and row-lock a checkout session until the transaction ends.
    pub(crate) async fn lock_checkout_session(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        reference: &str,
    ) -> Result<Option<CheckoutSessionRecord>, sqlx::Error> {
        query_as::<Postgres, CheckoutSessionRecord>(LOCK_CHECKOUT_SESSION_SQL)
            .bind(reference)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn complete_checkout_session(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        reference: &str,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(COMPLETE_CHECKOUT_SESSION_SQL)
            .bind(reference)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

fn into_uuids(appointments: &[AppointmentUuid]) -> Vec<Uuid> {
    appointments.iter().map(|uuid| uuid.into_uuid()).collect()
}

impl<'r> FromRow<'r, PgRow> for CheckoutSessionRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let amount_i64: i64 = row.try_get("amount")?;

        let amount = u64::try_from(amount_i64).map_err(|e| sqlx::Error::ColumnDecode {
            index: "amount".to_string(),
            source: Box::new(e),
        })?;

        let appointment_uuids = row
            .try_get::<Vec<Uuid>, _>("appointment_uuids")?
            .into_iter()
            .map(AppointmentUuid::from_uuid)
            .collect();

        Ok(Self {
            provider_reference: row.try_get("provider_reference")?,
            customer_uuid: CustomerUuid::from_uuid(row.try_get("customer_uuid")?),
            appointment_uuids,
            amount,
            currency: row.try_get("currency")?,
            checkout_url: row.try_get("checkout_url")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            completed_at: row
                .try_get::<Option<SqlxTimestamp>, _>("completed_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}
