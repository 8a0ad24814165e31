//! Appointments Repository

use std::str::FromStr;

use jiff::civil::Date;
use jiff_sqlx::{Date as SqlxDate, Timestamp as SqlxTimestamp};
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use tracing::debug;
use uuid::Uuid;

use crate::domain::appointments::{
    data::{AppointmentFilter, DailyCount, NewAppointment},
    records::{
        AppointmentRecord, AppointmentStatus, AppointmentUuid, CustomerUuid, PaymentMethod,
        PaymentStatus, ServiceUuid,
    },
    schedule::{SlotKey, TimeSlot},
};

const CREATE_APPOINTMENT_SQL: &str = include_str!("sql/create_appointment.sql");
const FIND_ACTIVE_IN_SLOT_SQL: &str = include_str!("sql/find_active_in_slot.sql");
const GET_APPOINTMENT_SQL: &str = include_str!("sql/get_appointment.sql");
const LOCK_APPOINTMENT_SQL: &str = include_str!("sql/lock_appointment.sql");
const UPDATE_APPOINTMENT_STATUS_SQL: &str = include_str!("sql/update_appointment_status.sql");
const UPDATE_APPOINTMENT_SLOT_SQL: &str = include_str!("sql/update_appointment_slot.sql");
const DELETE_APPOINTMENT_SQL: &str = include_str!("sql/delete_appointment.sql");
const LIST_CUSTOMER_APPOINTMENTS_SQL: &str = include_str!("sql/list_customer_appointments.sql");
const LIST_APPOINTMENTS_SQL: &str = include_str!("sql/list_appointments.sql");
const COUNT_APPOINTMENTS_BY_DAY_SQL: &str = include_str!("sql/count_appointments_by_day.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgAppointmentsRepository;

impl PgAppointmentsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Insert unless a live appointment already holds the slot key.
    ///
    /// Returns `None` when the slot is taken.
    #[tracing::instrument(
        name = "appointments.repository.create_appointment",
        skip(self, tx, appointment),
        fields(
            appointment_uuid = %appointment.uuid,
            service_uuid = %appointment.service_uuid,
            date = %appointment.date,
            time_slot = %appointment.time_slot
        ),
        err
    )]
    pub(crate) async fn create_appointment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: CustomerUuid,
        customer_email: &str,
        appointment: &NewAppointment,
    ) -> Result<Option<AppointmentRecord>, sqlx::Error> {
        query_as::<Postgres, AppointmentRecord>(CREATE_APPOINTMENT_SQL)
            .bind(appointment.uuid.into_uuid())
            .bind(customer.into_uuid())
            .bind(customer_email)
            .bind(appointment.service_uuid.into_uuid())
            .bind(&appointment.service_name)
            .bind(SqlxDate::from(appointment.date))
            .bind(appointment.time_slot.to_string())
            .bind(price_to_i64(appointment.price)?)
            .bind(appointment.payment_method.map(PaymentMethod::as_str))
            .bind(appointment.notes.as_deref())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn find_active_in_slot(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        slot: SlotKey,
    ) -> Result<Option<AppointmentUuid>, sqlx::Error> {
        let uuid: Option<Uuid> = sqlx::query_scalar(FIND_ACTIVE_IN_SLOT_SQL)
            .bind(slot.service_uuid.into_uuid())
            .bind(SqlxDate::from(slot.date))
            .bind(slot.time_slot.to_string())
            .fetch_optional(&mut **tx)
            .await?;

        Ok(uuid.map(AppointmentUuid::from_uuid))
    }

    pub(crate) async fn get_appointment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        appointment: AppointmentUuid,
    ) -> Result<AppointmentRecord, sqlx::Error> {
        query_as::<Postgres, AppointmentRecord>(GET_APPOINTMENT_SQL)
            .bind(appointment.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Fetch and row-lock an appointment until the transaction ends.
    pub(crate) async fn lock_appointment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        appointment: AppointmentUuid,
    ) -> Result<AppointmentRecord, sqlx::Error> {
        query_as::<Postgres, AppointmentRecord>(LOCK_APPOINTMENT_SQL)
            .bind(appointment.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    #[tracing::instrument(
        name = "appointments.repository.update_status",
        skip(self, tx),
        fields(appointment_uuid = %appointment, status = %status),
        err
    )]
    pub(crate) async fn update_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        appointment: AppointmentUuid,
        status: AppointmentStatus,
    ) -> Result<AppointmentRecord, sqlx::Error> {
        query_as::<Postgres, AppointmentRecord>(UPDATE_APPOINTMENT_STATUS_SQL)
            .bind(appointment.into_uuid())
            .bind(status.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    /// Move an appointment; a unique violation means the new slot is taken.
    #[tracing::instrument(
        name = "appointments.repository.update_slot",
        skip(self, tx),
        fields(appointment_uuid = %appointment, date = %date, time_slot = %time_slot),
        err
    )]
    pub(crate) async fn update_slot(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        appointment: AppointmentUuid,
        date: Date,
        time_slot: TimeSlot,
    ) -> Result<AppointmentRecord, sqlx::Error> {
        query_as::<Postgres, AppointmentRecord>(UPDATE_APPOINTMENT_SLOT_SQL)
            .bind(appointment.into_uuid())
            .bind(SqlxDate::from(date))
            .bind(time_slot.to_string())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_appointment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        appointment: AppointmentUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_APPOINTMENT_SQL)
            .bind(appointment.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn list_customer_appointments(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: CustomerUuid,
    ) -> Result<Vec<AppointmentRecord>, sqlx::Error> {
        query_as::<Postgres, AppointmentRecord>(LIST_CUSTOMER_APPOINTMENTS_SQL)
            .bind(customer.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_appointments(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        filter: &AppointmentFilter,
    ) -> Result<Vec<AppointmentRecord>, sqlx::Error> {
        query_as::<Postgres, AppointmentRecord>(LIST_APPOINTMENTS_SQL)
            .bind(filter.date.map(SqlxDate::from))
            .bind(filter.customer_email.as_deref())
            .fetch_all(&mut **tx)
            .await
    }

    /// Live appointment counts per day in `[from, until)`.
    #[tracing::instrument(
        name = "appointments.repository.count_by_day",
        skip(self, tx),
        fields(day_count = tracing::field::Empty),
        err
    )]
    pub(crate) async fn count_by_day(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        from: Date,
        until: Date,
    ) -> Result<Vec<DailyCount>, sqlx::Error> {
        let rows: Vec<(SqlxDate, i64)> = query_as(COUNT_APPOINTMENTS_BY_DAY_SQL)
            .bind(SqlxDate::from(from))
            .bind(SqlxDate::from(until))
            .fetch_all(&mut **tx)
            .await?;

        tracing::Span::current().record("day_count", rows.len());

        debug!(days = rows.len(), "counted appointments by day");

        rows.into_iter()
            .map(|(date, count)| {
                Ok(DailyCount {
                    date: date.to_jiff(),
                    count: u64::try_from(count).map_err(|e| sqlx::Error::ColumnDecode {
                        index: "count".to_string(),
                        source: Box::new(e),
                    })?,
                })
            })
            .collect()
    }
}

fn price_to_i64(price: u64) -> Result<i64, sqlx::Error> {
    i64::try_from(price).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

fn parse_column<T>(value: &str, column: &str) -> sqlx::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.parse().map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

fn decode_column<T>(row: &PgRow, column: &str) -> sqlx::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse_column(row.try_get::<&str, _>(column)?, column)
}

impl<'r> FromRow<'r, PgRow> for AppointmentRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let price_i64: i64 = row.try_get("price")?;

        let price = u64::try_from(price_i64).map_err(|e| sqlx::Error::ColumnDecode {
            index: "price".to_string(),
            source: Box::new(e),
        })?;

        let payment_method = row
            .try_get::<Option<String>, _>("payment_method")?
            .map(|method| parse_column::<PaymentMethod>(&method, "payment_method"))
            .transpose()?;

        Ok(Self {
            uuid: AppointmentUuid::from_uuid(row.try_get("uuid")?),
            customer_uuid: CustomerUuid::from_uuid(row.try_get("customer_uuid")?),
            customer_email: row.try_get("customer_email")?,
            service_uuid: ServiceUuid::from_uuid(row.try_get("service_uuid")?),
            service_name: row.try_get("service_name")?,
            date: row.try_get::<SqlxDate, _>("date")?.to_jiff(),
            time_slot: decode_column::<TimeSlot>(row, "time_slot")?,
            price,
            status: decode_column::<AppointmentStatus>(row, "status")?,
            payment_status: decode_column::<PaymentStatus>(row, "payment_status")?,
            payment_method,
            notes: row.try_get("notes")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
