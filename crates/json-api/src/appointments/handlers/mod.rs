//! Appointment Handlers

use std::sync::Arc;

use jiff::Timestamp;
use salvo::prelude::*;
use uuid::Uuid;

use salon_app::domain::appointments::transitions::Transition;

use crate::{appointments::errors::into_status_error, extensions::*, state::State};

use get::AppointmentResponse;

pub(crate) mod approve;
pub(crate) mod availability;
pub(crate) mod calendar;
pub(crate) mod cancel;
pub(crate) mod complete;
pub(crate) mod create;
pub(crate) mod delete;
pub(crate) mod get;
pub(crate) mod index;
pub(crate) mod my;
pub(crate) mod reschedule;

/// Apply `transition` to an appointment as the authenticated actor.
async fn apply_transition(
    depot: &Depot,
    appointment: Uuid,
    transition: Transition,
) -> Result<AppointmentResponse, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    tracing::Span::current().record("appointment_uuid", tracing::field::display(appointment));

    let record = state
        .app
        .appointments
        .transition(appointment.into(), transition, actor, Timestamp::now())
        .await
        .map_err(into_status_error)?;

    Ok(record.into())
}
