//! Checkout Verification Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use salon_app::domain::payments::records::CheckoutVerification;

use crate::{
    appointments::get::AppointmentResponse, extensions::*, payments::errors::into_status_error,
    state::State,
};

/// Verify Checkout Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VerifyCheckoutRequest {
    /// Provider checkout session id from the success redirect
    pub session_id: String,
}

/// Verify Checkout Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct VerifyCheckoutResponse {
    /// Whether the provider reports the session as paid
    pub paid: bool,

    /// The appointments covered by the session
    pub appointments: Vec<AppointmentResponse>,
}

impl From<CheckoutVerification> for VerifyCheckoutResponse {
    fn from(verification: CheckoutVerification) -> Self {
        VerifyCheckoutResponse {
            paid: verification.paid,
            appointments: verification
                .appointments
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }
}

/// Checkout Verification Handler
///
/// Called from the checkout success page. Reconciles the session when the
/// provider reports it paid, so a lost webhook does not leave it unpaid.
#[endpoint(
    tags("payments"),
    summary = "Verify Card Checkout",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Checkout state"),
        (status_code = StatusCode::NOT_FOUND, description = "Checkout session not found"),
        (status_code = StatusCode::BAD_GATEWAY, description = "Payment provider unavailable"),
    ),
)]
#[tracing::instrument(
    name = "payments.verify",
    skip(json, depot),
    fields(session = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<VerifyCheckoutRequest>,
    depot: &mut Depot,
) -> Result<Json<VerifyCheckoutResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let session = json.into_inner().session_id;

    tracing::Span::current().record("session", session.as_str());

    let verification = state
        .app
        .payments
        .verify_checkout(actor, &session)
        .await
        .map_err(into_status_error)?;

    Ok(Json(verification.into()))
}
