//! Complete Appointment Handler

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use salon_app::domain::appointments::transitions::Transition;

use crate::appointments::{get::AppointmentResponse, handlers::apply_transition};

/// Complete Appointment Handler
///
/// Marks a confirmed appointment as completed.
#[endpoint(
    tags("appointments"),
    summary = "Complete Appointment",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Appointment completed"),
        (status_code = StatusCode::FORBIDDEN, description = "Administrators only"),
        (status_code = StatusCode::NOT_FOUND, description = "Appointment not found"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Transition not allowed from the current status"),
    ),
)]
#[tracing::instrument(
    name = "appointments.complete",
    skip(appointment, depot),
    fields(appointment_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    appointment: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<AppointmentResponse>, StatusError> {
    Ok(Json(
        apply_transition(depot, appointment.into_inner(), Transition::Complete).await?,
    ))
}
