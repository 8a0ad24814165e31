//! Payment Errors

use salvo::http::StatusError;
use tracing::{error, warn};

use salon_app::domain::payments::{PaymentsServiceError, webhook::WebhookError};

pub(crate) fn into_status_error(error: PaymentsServiceError) -> StatusError {
    match error {
        PaymentsServiceError::NotFound => StatusError::not_found().brief("Appointment not found"),
        PaymentsServiceError::NotPayable => StatusError::unprocessable_entity()
            .brief("Appointment cannot be paid"),
        PaymentsServiceError::Validation(message) => StatusError::bad_request().brief(message),
        PaymentsServiceError::Provider(source) => {
            error!("payment provider failure: {source}");

            StatusError::bad_gateway().brief("Payment provider unavailable")
        }
        PaymentsServiceError::Webhook(source) => {
            warn!("rejected webhook: {source}");

            let brief = match source {
                WebhookError::MalformedPayload(_) => "Invalid webhook payload",
                WebhookError::MalformedSignature
                | WebhookError::InvalidSignature
                | WebhookError::StaleTimestamp => "Invalid webhook signature",
            };

            StatusError::bad_request().brief(brief)
        }
        PaymentsServiceError::Sql(source) => {
            error!("payment storage failure: {source}");

            StatusError::internal_server_error()
        }
    }
}
