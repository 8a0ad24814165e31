//! Reschedule Appointment Handler

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use salon_app::domain::appointments::{
    schedule::{TimeSlot, parse_date},
    transitions::Transition,
};

use crate::{
    appointments::{get::AppointmentResponse, handlers::apply_transition},
    extensions::*,
};

/// Reschedule Appointment Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RescheduleAppointmentRequest {
    /// `YYYY-MM-DD`
    pub date: String,

    /// `HH:MM`
    pub time_slot: String,
}

impl TryFrom<RescheduleAppointmentRequest> for Transition {
    type Error = StatusError;

    fn try_from(request: RescheduleAppointmentRequest) -> Result<Self, Self::Error> {
        Ok(Transition::Reschedule {
            date: parse_date(&request.date).or_400("date must be formatted as YYYY-MM-DD")?,
            time_slot: request
                .time_slot
                .parse::<TimeSlot>()
                .or_400("timeSlot must be formatted as HH:MM")?,
        })
    }
}

/// Reschedule Appointment Handler
///
/// Moves a pending appointment to another date and slot of the same service.
#[endpoint(
    tags("appointments"),
    summary = "Reschedule Appointment",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Appointment rescheduled"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::FORBIDDEN, description = "Not the owner or inside the cancellation window"),
        (status_code = StatusCode::NOT_FOUND, description = "Appointment not found"),
        (status_code = StatusCode::CONFLICT, description = "Time slot already booked"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Only pending appointments can be rescheduled"),
    ),
)]
#[tracing::instrument(
    name = "appointments.reschedule",
    skip(appointment, json, depot),
    fields(appointment_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    appointment: PathParam<Uuid>,
    json: JsonBody<RescheduleAppointmentRequest>,
    depot: &mut Depot,
) -> Result<Json<AppointmentResponse>, StatusError> {
    let transition = Transition::try_from(json.into_inner())?;

    Ok(Json(
        apply_transition(depot, appointment.into_inner(), transition).await?,
    ))
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use salon_app::domain::appointments::{
        AppointmentsServiceError, MockAppointmentsService,
        records::{AppointmentStatus, AppointmentUuid},
    };

    use crate::test_helpers::{appointments_service, inject_customer};

    use super::{super::tests::*, *};

    fn route() -> Router {
        Router::with_path("appointments/{appointment}").put(handler)
    }

    #[tokio::test]
    async fn test_reschedule_moves_slot() -> TestResult {
        let uuid = AppointmentUuid::new();
        let appointments = expect_transition(
            uuid,
            Transition::Reschedule {
                date: date(2025, 6, 2),
                time_slot: TimeSlot::new(14, 30)?,
            },
            Ok(AppointmentStatus::Pending),
        );

        let mut res = TestClient::put(format!("http://example.com/appointments/{uuid}"))
            .json(&json!({ "date": "2025-06-02", "timeSlot": "14:30" }))
            .send(&appointments_service(appointments, inject_customer, route()))
            .await;

        let body: AppointmentResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.id, uuid.into_uuid());

        Ok(())
    }

    #[tokio::test]
    async fn test_reschedule_onto_taken_slot_returns_409() -> TestResult {
        let uuid = AppointmentUuid::new();
        let appointments = expect_transition(
            uuid,
            Transition::Reschedule {
                date: date(2025, 6, 2),
                time_slot: TimeSlot::new(9, 0)?,
            },
            Err(AppointmentsServiceError::SlotTaken),
        );

        let res = TestClient::put(format!("http://example.com/appointments/{uuid}"))
            .json(&json!({ "date": "2025-06-02", "timeSlot": "09:00" }))
            .send(&appointments_service(appointments, inject_customer, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }

    #[tokio::test]
    async fn test_reschedule_bad_date_returns_400() {
        let res = TestClient::put(format!(
            "http://example.com/appointments/{}",
            AppointmentUuid::new()
        ))
        .json(&json!({ "date": "2/6/2025", "timeSlot": "09:00" }))
        .send(&appointments_service(
            MockAppointmentsService::new(),
            inject_customer,
            route(),
        ))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }
}
