//! Slot Availability Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::QueryParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use salon_app::domain::appointments::schedule::{SlotKey, TimeSlot, parse_date};

use crate::{appointments::errors::into_status_error, extensions::*, state::State};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AvailabilityResponse {
    /// Whether the slot can still be booked
    pub available: bool,
}

/// Slot Availability Handler
///
/// Reports whether a service, date and slot is free of live appointments.
#[endpoint(
    tags("appointments"),
    summary = "Check Slot Availability",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Availability"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
    ),
)]
pub(crate) async fn handler(
    service: QueryParam<Uuid, true>,
    date: QueryParam<String, true>,
    slot: QueryParam<String, true>,
    depot: &mut Depot,
) -> Result<Json<AvailabilityResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let slot = SlotKey {
        service_uuid: service.into_inner().into(),
        date: parse_date(&date.into_inner()).or_400("date must be formatted as YYYY-MM-DD")?,
        time_slot: slot
            .into_inner()
            .parse::<TimeSlot>()
            .or_400("slot must be formatted as HH:MM")?,
    };

    let availability = state
        .app
        .appointments
        .check_availability(slot)
        .await
        .map_err(into_status_error)?;

    Ok(Json(AvailabilityResponse {
        available: availability.is_available(),
    }))
}
