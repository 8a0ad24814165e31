//! Payment Provider Webhook Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::info;

use salon_app::domain::payments::records::{ReconciliationOutcome, WebhookOutcome};

use crate::{extensions::*, payments::errors::into_status_error, state::State};

/// Header carrying the `t=<unix>,v1=<hex>` signature.
pub(crate) const SIGNATURE_HEADER: &str = "stripe-signature";

/// Webhook Acknowledgement
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct WebhookResponse {
    pub received: bool,
}

/// Payment Provider Webhook Handler
///
/// Verifies the signature over the raw body before anything is parsed.
/// Storage failures answer 500 so the provider redelivers.
#[endpoint(
    tags("payments"),
    summary = "Payment Provider Webhook",
    responses(
        (status_code = StatusCode::OK, description = "Event acknowledged"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid signature or payload"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(name = "payments.webhook", skip(req, depot), err)]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<WebhookResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let signature = req
        .header::<String>(SIGNATURE_HEADER)
        .ok_or_else(|| StatusError::bad_request().brief("Missing webhook signature"))?;

    let payload = req
        .payload()
        .await
        .or_400("could not read webhook body")?
        .clone();

    let outcome = state
        .app
        .payments
        .handle_webhook(&payload, &signature, Timestamp::now())
        .await
        .map_err(into_status_error)?;

    match outcome {
        WebhookOutcome::Processed(ReconciliationOutcome::Reconciled { updated, skipped }) => {
            info!(
                updated = updated.len(),
                skipped = skipped.len(),
                "reconciled checkout from webhook"
            );
        }
        WebhookOutcome::Processed(outcome) => {
            info!(?outcome, "webhook required no changes");
        }
        WebhookOutcome::Ignored { event_type } => {
            info!(%event_type, "ignored webhook event");
        }
    }

    Ok(Json(WebhookResponse { received: true }))
}
