//! Appointments service errors.

use sqlx::{Error, error::ErrorKind};
use thiserror::Error;

use crate::domain::appointments::{
    records::AppointmentStatus, schedule::ScheduleError, transitions::Transition,
    window::ForbiddenReason,
};

/// Partial unique index holding one live booking per slot key.
const ACTIVE_SLOT_CONSTRAINT: &str = "appointments_active_slot_key";

#[derive(Debug, Error)]
pub enum AppointmentsServiceError {
    #[error("appointment not found")]
    NotFound,

    #[error("appointment already exists")]
    AlreadyExists,

    #[error("This time slot is already booked")]
    SlotTaken,

    #[error("{0}")]
    Forbidden(ForbiddenReason),

    #[error("cannot {transition} an appointment that is {from}")]
    InvalidTransition {
        from: AppointmentStatus,
        transition: Transition,
    },

    #[error("{0}")]
    Validation(&'static str),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for AppointmentsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        let Some(database_error) = error.as_database_error() else {
            return Self::Sql(error);
        };

        match database_error.kind() {
            ErrorKind::UniqueViolation
                if database_error.constraint() == Some(ACTIVE_SLOT_CONSTRAINT) =>
            {
                Self::SlotTaken
            }
            ErrorKind::UniqueViolation => Self::AlreadyExists,
            ErrorKind::CheckViolation | ErrorKind::NotNullViolation => {
                Self::Validation("appointment data violates a storage constraint")
            }
            ErrorKind::ForeignKeyViolation | ErrorKind::Other | _ => Self::Sql(error),
        }
    }
}
