//! Pay Single Appointment With Cash Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use smallvec::smallvec;
use uuid::Uuid;

use crate::{
    extensions::*,
    payments::{errors::into_status_error, handlers::CashPaymentResponse},
    state::State,
};

/// Pay Single Appointment With Cash Handler
#[endpoint(
    tags("payments"),
    summary = "Pay Appointment With Cash",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Number of appointments updated"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
    ),
)]
#[tracing::instrument(
    name = "payments.pay_with_cash",
    skip(appointment, depot),
    fields(appointment_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    appointment: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<CashPaymentResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let appointment = appointment.into_inner();

    tracing::Span::current().record("appointment_uuid", tracing::field::display(appointment));

    let updated = state
        .app
        .payments
        .confirm_cash_payment(actor, smallvec![appointment.into()])
        .await
        .map_err(into_status_error)?;

    Ok(Json(CashPaymentResponse { updated }))
}
