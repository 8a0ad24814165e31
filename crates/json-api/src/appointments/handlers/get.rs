//! Get Appointment Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use salon_app::domain::appointments::records::AppointmentRecord;

use crate::{appointments::errors::into_status_error, extensions::*, state::State};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AppointmentResponse {
    /// The unique identifier of the appointment
    pub id: Uuid,

    /// The customer who booked it
    pub customer_id: Uuid,

    /// The booked service
    pub service_id: Uuid,

    /// Customer email at booking time
    pub customer_email: String,

    /// Service name at booking time
    pub service_name: String,

    /// Calendar date, `YYYY-MM-DD`
    pub date: String,

    /// Wall-clock start, `HH:MM`
    pub time_slot: String,

    /// Price in minor currency units
    pub price: u64,

    /// `pending`, `confirmed`, `completed` or `cancelled`
    pub status: String,

    /// `unpaid` or `paid`
    pub payment_status: String,

    /// `card` or `cash`
    pub payment_method: Option<String>,

    /// Free-text note from the customer
    pub notes: Option<String>,

    /// The date and time the appointment was created
    pub created_at: String,

    /// The date and time the appointment was last updated
    pub updated_at: String,
}

impl From<AppointmentRecord> for AppointmentResponse {
    fn from(record: AppointmentRecord) -> Self {
        AppointmentResponse {
            id: record.uuid.into(),
            customer_id: record.customer_uuid.into(),
            service_id: record.service_uuid.into(),
            customer_email: record.customer_email,
            service_name: record.service_name,
            date: record.date.to_string(),
            time_slot: record.time_slot.to_string(),
            price: record.price,
            status: record.status.to_string(),
            payment_status: record.payment_status.to_string(),
            payment_method: record.payment_method.map(|method| method.to_string()),
            notes: record.notes,
            created_at: record.created_at.to_string(),
            updated_at: record.updated_at.to_string(),
        }
    }
}

/// Get Appointment Handler
///
/// Returns an appointment visible to the caller.
#[endpoint(
    tags("appointments"),
    summary = "Get Appointment",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Appointment"),
        (status_code = StatusCode::FORBIDDEN, description = "Not the owner"),
        (status_code = StatusCode::NOT_FOUND, description = "Appointment not found"),
    ),
)]
pub(crate) async fn handler(
    appointment: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<AppointmentResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let appointment = state
        .app
        .appointments
        .get_appointment(actor, appointment.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(appointment.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use salon_app::domain::appointments::{
        AppointmentsServiceError, MockAppointmentsService, records::AppointmentUuid,
        window::ForbiddenReason,
    };

    use crate::test_helpers::{
        TEST_CUSTOMER_UUID, appointments_service, inject_customer, make_appointment,
    };

    use super::*;

    fn make_service(appointments: MockAppointmentsService) -> Service {
        appointments_service(
            appointments,
            inject_customer,
            Router::with_path("appointments/{appointment}").get(handler),
        )
    }

    #[tokio::test]
    async fn test_get_appointment_renders_camel_case() -> TestResult {
        let uuid = AppointmentUuid::new();
        let appointment = make_appointment(uuid)?;

        let mut appointments = MockAppointmentsService::new();

        appointments
            .expect_get_appointment()
            .once()
            .withf(move |actor, requested| actor.uuid == TEST_CUSTOMER_UUID && *requested == uuid)
            .return_once(move |_, _| Ok(appointment));

        let mut res = TestClient::get(format!("http://example.com/appointments/{uuid}"))
            .send(&make_service(appointments))
            .await;

        let body: serde_json::Value = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body["id"], uuid.to_string());
        assert_eq!(body["timeSlot"], "10:00");
        assert_eq!(body["date"], "2025-06-01");
        assert_eq!(body["paymentStatus"], "unpaid");
        assert_eq!(body["serviceName"], "Haircut");

        Ok(())
    }

    #[tokio::test]
    async fn test_get_foreign_appointment_returns_403() -> TestResult {
        let mut appointments = MockAppointmentsService::new();

        appointments
            .expect_get_appointment()
            .once()
            .return_once(|_, _| Err(AppointmentsServiceError::Forbidden(ForbiddenReason::NotOwner)));

        let res = TestClient::get(format!(
            "http://example.com/appointments/{}",
            AppointmentUuid::new()
        ))
        .send(&make_service(appointments))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_unknown_appointment_returns_404() -> TestResult {
        let mut appointments = MockAppointmentsService::new();

        appointments
            .expect_get_appointment()
            .once()
            .return_once(|_, _| Err(AppointmentsServiceError::NotFound));

        let res = TestClient::get(format!(
            "http://example.com/appointments/{}",
            AppointmentUuid::new()
        ))
        .send(&make_service(appointments))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
