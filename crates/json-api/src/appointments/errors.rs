//! Appointment Errors

use salvo::http::StatusError;
use tracing::error;

use salon_app::domain::appointments::AppointmentsServiceError;

pub(crate) fn into_status_error(error: AppointmentsServiceError) -> StatusError {
    match error {
        AppointmentsServiceError::NotFound => StatusError::not_found().brief("Appointment not found"),
        AppointmentsServiceError::AlreadyExists => {
            StatusError::conflict().brief("Appointment already exists")
        }
        AppointmentsServiceError::SlotTaken => {
            StatusError::conflict().brief("This time slot is already booked")
        }
        AppointmentsServiceError::Forbidden(reason) => StatusError::forbidden().brief(reason.message()),
        error @ AppointmentsServiceError::InvalidTransition { .. } => {
            StatusError::unprocessable_entity().brief(error.to_string())
        }
        AppointmentsServiceError::Validation(message) => StatusError::bad_request().brief(message),
        AppointmentsServiceError::Schedule(source) => {
            StatusError::bad_request().brief(source.to_string())
        }
        AppointmentsServiceError::Sql(source) => {
            error!("appointment storage failure: {source}");

            StatusError::internal_server_error()
        }
    }
}
