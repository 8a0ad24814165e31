//! Cash Payment Handler

use std::sync::Arc;

use salvo::{oapi::extract::JsonBody, prelude::*};

use crate::{
    extensions::*,
    payments::{
        errors::into_status_error,
        handlers::{AppointmentIdsRequest, CashPaymentResponse},
    },
    state::State,
};

/// Cash Payment Handler
///
/// Marks the caller's unpaid appointments as paid in cash. Ids that are not
/// the caller's, already paid or cancelled are skipped.
#[endpoint(
    tags("payments"),
    summary = "Pay With Cash",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Number of appointments updated"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
    ),
)]
#[tracing::instrument(
    name = "payments.cash",
    skip(json, depot),
    fields(requested = tracing::field::Empty, updated = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<AppointmentIdsRequest>,
    depot: &mut Depot,
) -> Result<Json<CashPaymentResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let request = json.into_inner();
    let span = tracing::Span::current();

    span.record("requested", request.appointment_ids.len());

    let updated = state
        .app
        .payments
        .confirm_cash_payment(actor, request.into())
        .await
        .map_err(into_status_error)?;

    span.record("updated", updated);

    Ok(Json(CashPaymentResponse { updated }))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use smallvec::smallvec;
    use testresult::TestResult;

    use salon_app::domain::{
        appointments::records::AppointmentUuid,
        payments::{MockPaymentsService, PaymentsServiceError, records::AppointmentUuids},
    };

    use crate::test_helpers::{TEST_CUSTOMER_UUID, inject_customer, payments_service};

    use super::*;

    fn make_service(payments: MockPaymentsService) -> Service {
        payments_service(
            payments,
            inject_customer,
            Router::with_path("payments/cash").post(handler),
        )
    }

    #[tokio::test]
    async fn test_cash_payment_reports_updated_count() -> TestResult {
        let first = AppointmentUuid::new();
        let second = AppointmentUuid::new();
        let expected: AppointmentUuids = smallvec![first, second];

        let mut payments = MockPaymentsService::new();

        payments
            .expect_confirm_cash_payment()
            .once()
            .withf(move |actor, ids| actor.uuid == TEST_CUSTOMER_UUID && *ids == expected)
            .return_once(|_, _| Ok(2));

        let mut res = TestClient::post("http://example.com/payments/cash")
            .json(&json!({ "appointmentIds": [first.into_uuid(), second.into_uuid()] }))
            .send(&make_service(payments))
            .await;

        let body: CashPaymentResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.updated, 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_cash_payment_nothing_to_update_is_ok() -> TestResult {
        let mut payments = MockPaymentsService::new();

        payments
            .expect_confirm_cash_payment()
            .once()
            .return_once(|_, _| Ok(0));

        let mut res = TestClient::post("http://example.com/payments/cash")
            .json(&json!({ "appointmentIds": [AppointmentUuid::new().into_uuid()] }))
            .send(&make_service(payments))
            .await;

        let body: CashPaymentResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.updated, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_cash_payment_empty_list_returns_400() -> TestResult {
        let mut payments = MockPaymentsService::new();

        payments
            .expect_confirm_cash_payment()
            .once()
            .return_once(|_, _| {
                Err(PaymentsServiceError::Validation(
                    "at least one appointment id is required",
                ))
            });

        let res = TestClient::post("http://example.com/payments/cash")
            .json(&json!({ "appointmentIds": [] }))
            .send(&make_service(payments))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
