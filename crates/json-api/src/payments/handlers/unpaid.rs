//! Unpaid Appointments Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    appointments::my::AppointmentsResponse, extensions::*, payments::errors::into_status_error,
    state::State,
};

/// Unpaid Appointments Handler
///
/// Returns the caller's unpaid, live appointments ordered by date and slot.
#[endpoint(
    tags("payments"),
    summary = "List Unpaid Appointments",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<AppointmentsResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let appointments = state
        .app
        .payments
        .list_unpaid(actor)
        .await
        .map_err(into_status_error)?;

    Ok(Json(AppointmentsResponse {
        appointments: appointments.into_iter().map(Into::into).collect(),
    }))
}
