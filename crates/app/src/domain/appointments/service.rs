//! Appointments service.

use async_trait::async_trait;
use jiff::{Timestamp, ToSpan, civil::Date, tz::TimeZone};
use mockall::automock;
use tracing::{Span, info};

use crate::{
    auth::Actor,
    database::Db,
    domain::appointments::{
        data::{AppointmentFilter, Availability, DailyCount, MAX_NOTES_CHARS, NewAppointment},
        errors::AppointmentsServiceError,
        records::{AppointmentRecord, AppointmentUuid},
        repository::PgAppointmentsRepository,
        schedule::{SlotKey, TimeSlot, appointment_instant},
        transitions::{Transition, authorize},
        window::ForbiddenReason,
    },
};

#[derive(Debug, Clone)]
pub struct PgAppointmentsService {
    db: Db,
    repository: PgAppointmentsRepository,
    time_zone: TimeZone,
}

impl PgAppointmentsService {
    /// Build the service; appointment dates and slots are read in `time_zone`.
    #[must_use]
    pub fn new(db: Db, time_zone: TimeZone) -> Self {
        Self {
            db,
            repository: PgAppointmentsRepository::new(),
            time_zone,
        }
    }

    fn validate_new(
        &self,
        appointment: &NewAppointment,
        now: Timestamp,
    ) -> Result<(), AppointmentsServiceError> {
        if appointment.service_name.trim().is_empty() {
            return Err(AppointmentsServiceError::Validation(
                "service name is required",
            ));
        }

        if i64::try_from(appointment.price).is_err() {
            return Err(AppointmentsServiceError::Validation("price is out of range"));
        }

        if appointment
            .notes
            .as_deref()
            .is_some_and(|notes| notes.chars().count() > MAX_NOTES_CHARS)
        {
            return Err(AppointmentsServiceError::Validation(
                "notes must be at most 500 characters",
            ));
        }

        self.ensure_future(appointment.date, appointment.time_slot, now)
    }

    fn ensure_future(
        &self,
        date: Date,
        time_slot: TimeSlot,
        now: Timestamp,
    ) -> Result<(), AppointmentsServiceError> {
        if appointment_instant(date, time_slot, &self.time_zone)? <= now {
            return Err(AppointmentsServiceError::Validation(
                "appointment time must be in the future",
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl AppointmentsService for PgAppointmentsService {
    async fn check_availability(
        &self,
        slot: SlotKey,
    ) -> Result<Availability, AppointmentsServiceError> {
        let mut tx = self.db.begin().await?;

        let holder = self.repository.find_active_in_slot(&mut tx, slot).await?;

        tx.commit().await?;

        Ok(match holder {
            Some(_) => Availability::Conflict,
            None => Availability::Available,
        })
    }

    #[tracing::instrument(
        name = "appointments.service.create_appointment",
        skip(self, actor, appointment),
        fields(
            customer_uuid = %actor.uuid,
            appointment_uuid = %appointment.uuid,
            service_uuid = %appointment.service_uuid
        ),
        err
    )]
    async fn create_appointment(
        &self,
        actor: &Actor,
        appointment: NewAppointment,
        now: Timestamp,
    ) -> Result<AppointmentRecord, AppointmentsServiceError> {
        self.validate_new(&appointment, now)?;

        let mut tx = self.db.begin().await?;

        let created = self
            .repository
            .create_appointment(&mut tx, actor.uuid, &actor.email, &appointment)
            .await?
            .ok_or(AppointmentsServiceError::SlotTaken)?;

        tx.commit().await?;

        info!(
            appointment_uuid = %created.uuid,
            date = %created.date,
            time_slot = %created.time_slot,
            "booked appointment"
        );

        Ok(created)
    }

    async fn get_appointment(
        &self,
        actor: &Actor,
        appointment: AppointmentUuid,
    ) -> Result<AppointmentRecord, AppointmentsServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.repository.get_appointment(&mut tx, appointment).await?;

        tx.commit().await?;

        if !actor.is_admin && !record.is_owned_by(actor.uuid) {
            return Err(AppointmentsServiceError::Forbidden(
                ForbiddenReason::NotOwner,
            ));
        }

        Ok(record)
    }

    async fn list_my_appointments(
        &self,
        actor: &Actor,
    ) -> Result<Vec<AppointmentRecord>, AppointmentsServiceError> {
        let mut tx = self.db.begin().await?;

        let appointments = self
            .repository
            .list_customer_appointments(&mut tx, actor.uuid)
            .await?;

        tx.commit().await?;

        Ok(appointments)
    }

    async fn list_appointments(
        &self,
        actor: &Actor,
        filter: AppointmentFilter,
    ) -> Result<Vec<AppointmentRecord>, AppointmentsServiceError> {
        if !actor.is_admin {
            return Err(AppointmentsServiceError::Forbidden(
                ForbiddenReason::AdminOnly,
            ));
        }

        let mut tx = self.db.begin().await?;

        let appointments = self.repository.list_appointments(&mut tx, &filter).await?;

        tx.commit().await?;

        Ok(appointments)
    }

    async fn appointment_calendar(
        &self,
        actor: &Actor,
        month: Date,
    ) -> Result<Vec<DailyCount>, AppointmentsServiceError> {
        if !actor.is_admin {
            return Err(AppointmentsServiceError::Forbidden(
                ForbiddenReason::AdminOnly,
            ));
        }

        let first = month.first_of_month();
        let next = first
            .checked_add(1.month())
            .map_err(|_| AppointmentsServiceError::Validation("month is out of range"))?;

        let mut tx = self.db.begin().await?;

        let counts = self.repository.count_by_day(&mut tx, first, next).await?;

        tx.commit().await?;

        Ok(counts)
    }

    #[tracing::instrument(
        name = "appointments.service.transition",
        skip(self, actor),
        fields(
            appointment_uuid = %appointment,
            transition = %transition,
            actor_uuid = %actor.uuid,
            is_admin = actor.is_admin,
            from_status = tracing::field::Empty
        ),
        err
    )]
    async fn transition(
        &self,
        appointment: AppointmentUuid,
        transition: Transition,
        actor: &Actor,
        now: Timestamp,
    ) -> Result<AppointmentRecord, AppointmentsServiceError> {
        let mut tx = self.db.begin().await?;

        let current = self.repository.lock_appointment(&mut tx, appointment).await?;

        Span::current().record("from_status", tracing::field::display(current.status));

        authorize(&current, transition, actor, now, &self.time_zone)?;

        let updated = match (transition, transition.target()) {
            (Transition::Reschedule { date, time_slot }, _) => {
                if date == current.date && time_slot == current.time_slot {
                    return Ok(current);
                }

                self.ensure_future(date, time_slot, now)?;

                self.repository
                    .update_slot(&mut tx, appointment, date, time_slot)
                    .await?
            }
            (_, Some(status)) => {
                self.repository
                    .update_status(&mut tx, appointment, status)
                    .await?
            }
            (_, None) => {
                self.repository
                    .delete_appointment(&mut tx, appointment)
                    .await?;

                current
            }
        };

        tx.commit().await?;

        info!(
            appointment_uuid = %appointment,
            transition = %transition,
            status = %updated.status,
            "applied appointment transition"
        );

        Ok(updated)
    }
}

#[automock]
#[async_trait]
pub trait AppointmentsService: Send + Sync {
    /// Report whether a slot key is free of live appointments.
    async fn check_availability(
        &self,
        slot: SlotKey,
    ) -> Result<Availability, AppointmentsServiceError>;

    /// Book a slot for the actor; the slot is claimed atomically.
    async fn create_appointment(
        &self,
        actor: &Actor,
        appointment: NewAppointment,
        now: Timestamp,
    ) -> Result<AppointmentRecord, AppointmentsServiceError>;

    /// Retrieve an appointment visible to the actor.
    async fn get_appointment(
        &self,
        actor: &Actor,
        appointment: AppointmentUuid,
    ) -> Result<AppointmentRecord, AppointmentsServiceError>;

    /// The actor's own appointments, newest first.
    async fn list_my_appointments(
        &self,
        actor: &Actor,
    ) -> Result<Vec<AppointmentRecord>, AppointmentsServiceError>;

    /// All appointments matching `filter`. Admin only.
    async fn list_appointments(
        &self,
        actor: &Actor,
        filter: AppointmentFilter,
    ) -> Result<Vec<AppointmentRecord>, AppointmentsServiceError>;

    /// Live appointment counts per day of the month containing `month`. Admin only.
    async fn appointment_calendar(
        &self,
        actor: &Actor,
        month: Date,
    ) -> Result<Vec<DailyCount>, AppointmentsServiceError>;

    /// Apply a status transition, reschedule or removal under a row lock.
    async fn transition(
        &self,
        appointment: AppointmentUuid,
        transition: Transition,
        actor: &Actor,
        now: Timestamp,
    ) -> Result<AppointmentRecord, AppointmentsServiceError>;
}
