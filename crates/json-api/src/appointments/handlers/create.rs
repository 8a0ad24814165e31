//! Create Appointment Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use salon_app::domain::appointments::{
    data::NewAppointment,
    records::{AppointmentUuid, PaymentMethod},
    schedule::{TimeSlot, parse_date},
};

use crate::{
    appointments::{errors::into_status_error, get::AppointmentResponse},
    extensions::*,
    state::State,
};

/// Create Appointment Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateAppointmentRequest {
    /// Client-chosen identifier; generated when omitted
    #[serde(default)]
    pub id: Option<Uuid>,

    pub service_id: Uuid,

    pub service_name: String,

    /// `YYYY-MM-DD`
    pub date: String,

    /// `HH:MM`
    pub time_slot: String,

    /// Price in minor currency units
    pub price: u64,

    /// `card` or `cash`
    #[serde(default)]
    pub payment_method: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,
}

impl CreateAppointmentRequest {
    fn into_new_appointment(self) -> Result<NewAppointment, StatusError> {
        let date = parse_date(&self.date).or_400("date must be formatted as YYYY-MM-DD")?;

        let time_slot = self
            .time_slot
            .parse::<TimeSlot>()
            .or_400("timeSlot must be formatted as HH:MM")?;

        let payment_method = self
            .payment_method
            .map(|method| method.parse::<PaymentMethod>())
            .transpose()
            .or_400("paymentMethod must be card or cash")?;

        Ok(NewAppointment {
            uuid: self.id.map_or_else(AppointmentUuid::new, Into::into),
            service_uuid: self.service_id.into(),
            service_name: self.service_name,
            date,
            time_slot,
            price: self.price,
            payment_method,
            notes: self.notes,
        })
    }
}

/// Create Appointment Handler
///
/// Books a slot for the authenticated customer.
#[endpoint(
    tags("appointments"),
    summary = "Create Appointment",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Appointment booked"),
        (status_code = StatusCode::CONFLICT, description = "Time slot already booked or appointment id reused"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "appointments.create",
    skip(json, depot, res),
    fields(appointment_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CreateAppointmentRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<AppointmentResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let appointment = json.into_inner().into_new_appointment()?;

    tracing::Span::current().record("appointment_uuid", tracing::field::display(appointment.uuid));

    let appointment = state
        .app
        .appointments
        .create_appointment(actor, appointment, Timestamp::now())
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/appointments/{}", appointment.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(appointment.into()))
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use salon_app::domain::appointments::{
        AppointmentsServiceError, MockAppointmentsService, records::ServiceUuid,
    };

    use crate::test_helpers::{
        TEST_CUSTOMER_UUID, appointments_service, inject_customer, make_appointment,
    };

    use super::*;

    fn make_service(appointments: MockAppointmentsService) -> Service {
        appointments_service(
            appointments,
            inject_customer,
            Router::with_path("appointments").post(handler),
        )
    }

    #[tokio::test]
    async fn test_create_appointment_success() -> TestResult {
        let uuid = AppointmentUuid::new();
        let service = ServiceUuid::new();
        let appointment = make_appointment(uuid)?;
        let expected = NewAppointment {
            uuid,
            service_uuid: service,
            service_name: "Haircut".to_string(),
            date: date(2025, 6, 1),
            time_slot: TimeSlot::new(10, 0)?,
            price: 2500,
            payment_method: Some(PaymentMethod::Cash),
            notes: Some("short please".to_string()),
        };

        let mut appointments = MockAppointmentsService::new();

        appointments
            .expect_create_appointment()
            .once()
            .withf(move |actor, new, _| actor.uuid == TEST_CUSTOMER_UUID && *new == expected)
            .return_once(move |_, _, _| Ok(appointment));

        let mut res = TestClient::post("http://example.com/appointments")
            .json(&json!({
                "id": uuid.into_uuid(),
                "serviceId": service.into_uuid(),
                "serviceName": "Haircut",
                "date": "2025-06-01",
                "timeSlot": "10:00",
                "price": 2500,
                "paymentMethod": "cash",
                "notes": "short please",
            }))
            .send(&make_service(appointments))
            .await;

        let body: AppointmentResponse = res.take_json().await?;
        let location = res.headers().get("location").and_then(|v| v.to_str().ok());

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(location, Some(format!("/appointments/{uuid}").as_str()));
        assert_eq!(body.id, uuid.into_uuid());
        assert_eq!(body.status, "pending");

        Ok(())
    }

    #[tokio::test]
    async fn test_create_appointment_slot_taken_returns_409() -> TestResult {
        let mut appointments = MockAppointmentsService::new();

        appointments
            .expect_create_appointment()
            .once()
            .return_once(|_, _, _| Err(AppointmentsServiceError::SlotTaken));

        let res = TestClient::post("http://example.com/appointments")
            .json(&json!({
                "serviceId": Uuid::now_v7(),
                "serviceName": "Haircut",
                "date": "2025-06-01",
                "timeSlot": "10:00",
                "price": 2500,
            }))
            .send(&make_service(appointments))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_appointment_reused_id_returns_409() -> TestResult {
        let uuid = AppointmentUuid::new();
        let mut appointments = MockAppointmentsService::new();

        appointments
            .expect_create_appointment()
            .once()
            .withf(move |_, new, _| new.uuid == uuid)
            .return_once(|_, _, _| Err(AppointmentsServiceError::AlreadyExists));

        let res = TestClient::post("http://example.com/appointments")
            .json(&json!({
                "id": uuid.into_uuid(),
                "serviceId": Uuid::now_v7(),
                "serviceName": "Haircut",
                "date": "2025-06-01",
                "timeSlot": "11:00",
                "price": 2500,
            }))
            .send(&make_service(appointments))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_appointment_bad_time_slot_returns_400() -> TestResult {
        let res = TestClient::post("http://example.com/appointments")
            .json(&json!({
                "serviceId": Uuid::now_v7(),
                "serviceName": "Haircut",
                "date": "2025-06-01",
                "timeSlot": "10am",
                "price": 2500,
            }))
            .send(&make_service(MockAppointmentsService::new()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_appointment_unknown_payment_method_returns_400() -> TestResult {
        let res = TestClient::post("http://example.com/appointments")
            .json(&json!({
                "serviceId": Uuid::now_v7(),
                "serviceName": "Haircut",
                "date": "2025-06-01",
                "timeSlot": "10:00",
                "price": 2500,
                "paymentMethod": "cheque",
            }))
            .send(&make_service(MockAppointmentsService::new()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_appointment_past_time_returns_400() -> TestResult {
        let mut appointments = MockAppointmentsService::new();

        appointments
            .expect_create_appointment()
            .once()
            .return_once(|_, _, _| {
                Err(AppointmentsServiceError::Validation(
                    "appointment time must be in the future",
                ))
            });

        let res = TestClient::post("http://example.com/appointments")
            .json(&json!({
                "serviceId": Uuid::now_v7(),
                "serviceName": "Haircut",
                "date": "2020-01-01",
                "timeSlot": "10:00",
                "price": 2500,
            }))
            .send(&make_service(appointments))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
