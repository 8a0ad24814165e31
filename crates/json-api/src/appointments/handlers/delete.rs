//! Remove Appointment Handler

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use salon_app::domain::appointments::transitions::Transition;

use crate::appointments::handlers::apply_transition;

/// Remove Appointment Handler
///
/// Physically removes a pending or confirmed appointment.
#[endpoint(
    tags("admin"),
    summary = "Remove Appointment",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Appointment removed"),
        (status_code = StatusCode::FORBIDDEN, description = "Administrators only"),
        (status_code = StatusCode::NOT_FOUND, description = "Appointment not found"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Completed or cancelled appointments are kept"),
    ),
)]
#[tracing::instrument(
    name = "appointments.remove",
    skip(appointment, depot),
    fields(appointment_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    appointment: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<StatusCode, StatusError> {
    apply_transition(depot, appointment.into_inner(), Transition::Delete).await?;

    Ok(StatusCode::OK)
}
