//! Card Checkout Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use salon_app::domain::payments::records::CheckoutIntent;

use crate::{
    extensions::*,
    payments::{errors::into_status_error, handlers::AppointmentIdsRequest},
    state::State,
};

/// Checkout Created Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CheckoutResponse {
    /// Provider checkout session id
    pub id: String,

    /// Hosted payment page to redirect the customer to
    pub url: String,
}

impl From<CheckoutIntent> for CheckoutResponse {
    fn from(intent: CheckoutIntent) -> Self {
        CheckoutResponse {
            id: intent.id,
            url: intent.url,
        }
    }
}

/// Card Checkout Handler
///
/// Opens a hosted card checkout for the caller's unpaid appointments, or
/// returns the open one for the same appointments. Nothing is marked paid
/// until the provider confirms.
#[endpoint(
    tags("payments"),
    summary = "Create Card Checkout",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Checkout session opened"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::NOT_FOUND, description = "Appointment not found"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Appointment cannot be paid"),
        (status_code = StatusCode::BAD_GATEWAY, description = "Payment provider unavailable"),
    ),
)]
#[tracing::instrument(
    name = "payments.checkout",
    skip(json, depot),
    fields(requested = tracing::field::Empty, session = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<AppointmentIdsRequest>,
    depot: &mut Depot,
) -> Result<Json<CheckoutResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let request = json.into_inner();
    let span = tracing::Span::current();

    span.record("requested", request.appointment_ids.len());

    let intent = state
        .app
        .payments
        .create_checkout_intent(actor, request.into())
        .await
        .map_err(into_status_error)?;

    span.record("session", intent.id.as_str());

    Ok(Json(intent.into()))
}
