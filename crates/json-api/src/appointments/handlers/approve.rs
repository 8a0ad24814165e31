//! Approve Appointment Handler

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use salon_app::domain::appointments::transitions::Transition;

use crate::appointments::{get::AppointmentResponse, handlers::apply_transition};

/// Approve Appointment Handler
///
/// Confirms a pending appointment.
#[endpoint(
    tags("appointments"),
    summary = "Approve Appointment",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Appointment confirmed"),
        (status_code = StatusCode::FORBIDDEN, description = "Administrators only"),
        (status_code = StatusCode::NOT_FOUND, description = "Appointment not found"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Transition not allowed from the current status"),
    ),
)]
#[tracing::instrument(
    name = "appointments.approve",
    skip(appointment, depot),
    fields(appointment_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    appointment: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<AppointmentResponse>, StatusError> {
    Ok(Json(
        apply_transition(depot, appointment.into_inner(), Transition::Approve).await?,
    ))
}
