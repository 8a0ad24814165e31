//! Appointment Index Handler

use std::sync::Arc;

use salvo::{oapi::extract::QueryParam, prelude::*};

use salon_app::domain::appointments::data::AppointmentFilter;

use crate::{
    appointments::{errors::into_status_error, my::AppointmentsResponse},
    extensions::*,
    state::State,
};

/// Appointment Index Handler
///
/// Returns every appointment, optionally narrowed to one date or customer email.
#[endpoint(
    tags("appointments"),
    summary = "List Appointments",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Appointments"),
        (status_code = StatusCode::FORBIDDEN, description = "Administrators only"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
    ),
)]
pub(crate) async fn handler(
    date: QueryParam<String, false>,
    email: QueryParam<String, false>,
    depot: &mut Depot,
) -> Result<Json<AppointmentsResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let filter = AppointmentFilter {
        date: date.into_date("date")?,
        customer_email: email.into_inner().filter(|email| !email.trim().is_empty()),
    };

    let appointments = state
        .app
        .appointments
        .list_appointments(actor, filter)
        .await
        .map_err(into_status_error)?;

    Ok(Json(AppointmentsResponse {
        appointments: appointments.into_iter().map(Into::into).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use salon_app::domain::appointments::{
        AppointmentsServiceError, MockAppointmentsService, records::AppointmentUuid,
        window::ForbiddenReason,
    };

    use crate::test_helpers::{
        appointments_service, inject_admin, inject_customer, make_appointment,
    };

    use super::*;

    fn route() -> Router {
        Router::with_path("appointments").get(handler)
    }

    #[tokio::test]
    async fn test_index_passes_filters() -> TestResult {
        let appointment = make_appointment(AppointmentUuid::new())?;

        let mut appointments = MockAppointmentsService::new();

        appointments
            .expect_list_appointments()
            .once()
            .withf(|actor, filter| {
                actor.is_admin
                    && *filter
                        == AppointmentFilter {
                            date: Some(date(2025, 6, 1)),
                            customer_email: Some("jane@example.com".to_string()),
                        }
            })
            .return_once(move |_, _| Ok(vec![appointment]));

        let mut res = TestClient::get(
            "http://example.com/appointments?date=2025-06-01&email=jane@example.com",
        )
        .send(&appointments_service(appointments, inject_admin, route()))
        .await;

        let body: AppointmentsResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.appointments.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_index_without_filters() -> TestResult {
        let mut appointments = MockAppointmentsService::new();

        appointments
            .expect_list_appointments()
            .once()
            .withf(|_, filter| *filter == AppointmentFilter::default())
            .return_once(|_, _| Ok(Vec::new()));

        let res = TestClient::get("http://example.com/appointments")
            .send(&appointments_service(appointments, inject_admin, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_index_for_customer_returns_403() -> TestResult {
        let mut appointments = MockAppointmentsService::new();

        appointments
            .expect_list_appointments()
            .once()
            .return_once(|_, _| Err(AppointmentsServiceError::Forbidden(ForbiddenReason::AdminOnly)));

        let res = TestClient::get("http://example.com/appointments")
            .send(&appointments_service(appointments, inject_customer, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }

    #[tokio::test]
    async fn test_index_bad_date_returns_400() {
        let res = TestClient::get("http://example.com/appointments?date=June")
            .send(&appointments_service(
                MockAppointmentsService::new(),
                inject_admin,
                route(),
            ))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }
}
