//! Cancel Appointment Handlers

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use salon_app::domain::appointments::transitions::Transition;

use crate::appointments::{get::AppointmentResponse, handlers::apply_transition};

/// Cancel Appointment Handler
///
/// Cancels an appointment. Owners must act at least 24 hours before the start.
#[endpoint(
    tags("appointments"),
    summary = "Cancel Appointment",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Appointment cancelled"),
        (status_code = StatusCode::FORBIDDEN, description = "Not the owner or inside the cancellation window"),
        (status_code = StatusCode::NOT_FOUND, description = "Appointment not found"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Appointment already completed or cancelled"),
    ),
)]
#[tracing::instrument(
    name = "appointments.cancel",
    skip(appointment, depot),
    fields(appointment_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    appointment: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<AppointmentResponse>, StatusError> {
    Ok(Json(
        apply_transition(depot, appointment.into_inner(), Transition::Cancel).await?,
    ))
}

/// Delete Appointment Handler
///
/// Same as cancelling; the appointment is kept with status `cancelled`.
#[endpoint(
    tags("appointments"),
    summary = "Delete Appointment",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Appointment cancelled"),
        (status_code = StatusCode::FORBIDDEN, description = "Not the owner or inside the cancellation window"),
        (status_code = StatusCode::NOT_FOUND, description = "Appointment not found"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Appointment already completed or cancelled"),
    ),
)]
#[tracing::instrument(
    name = "appointments.delete",
    skip(appointment, depot),
    fields(appointment_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn delete_handler(
    appointment: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<AppointmentResponse>, StatusError> {
    Ok(Json(
        apply_transition(depot, appointment.into_inner(), Transition::Cancel).await?,
    ))
}
