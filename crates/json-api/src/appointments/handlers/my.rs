//! My Appointments Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    appointments::{errors::into_status_error, get::AppointmentResponse},
    extensions::*,
    state::State,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AppointmentsResponse {
    /// The list of appointments
    pub appointments: Vec<AppointmentResponse>,
}

/// My Appointments Handler
///
/// Returns the caller's appointments, newest first.
#[endpoint(
    tags("appointments"),
    summary = "List My Appointments",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<AppointmentsResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let appointments = state
        .app
        .appointments
        .list_my_appointments(actor)
        .await
        .map_err(into_status_error)?;

    Ok(Json(AppointmentsResponse {
        appointments: appointments.into_iter().map(Into::into).collect(),
    }))
}
