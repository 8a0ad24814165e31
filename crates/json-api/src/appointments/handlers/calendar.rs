//! Appointment Calendar Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use salon_app::domain::appointments::{data::DailyCount, schedule::parse_month};

use crate::{appointments::errors::into_status_error, extensions::*, state::State};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct DayCountResponse {
    /// `YYYY-MM-DD`
    pub date: String,

    /// Live appointments on that day
    pub count: u64,
}

impl From<DailyCount> for DayCountResponse {
    fn from(day: DailyCount) -> Self {
        DayCountResponse {
            date: day.date.to_string(),
            count: day.count,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CalendarResponse {
    /// `YYYY-MM`
    pub month: String,

    /// Days with at least one live appointment
    pub days: Vec<DayCountResponse>,
}

/// Appointment Calendar Handler
///
/// Returns per-day appointment counts for a month.
#[endpoint(
    tags("appointments"),
    summary = "Appointment Calendar",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Daily counts"),
        (status_code = StatusCode::FORBIDDEN, description = "Administrators only"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
    ),
)]
pub(crate) async fn handler(
    month: PathParam<String>,
    depot: &mut Depot,
) -> Result<Json<CalendarResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let month = month.into_inner();
    let first_day = parse_month(&month).or_400("month must be formatted as YYYY-MM")?;

    let days = state
        .app
        .appointments
        .appointment_calendar(actor, first_day)
        .await
        .map_err(into_status_error)?;

    Ok(Json(CalendarResponse {
        month,
        days: days.into_iter().map(Into::into).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use salon_app::domain::appointments::MockAppointmentsService;

    use crate::test_helpers::{appointments_service, inject_admin};

    use super::*;

    fn make_service(appointments: MockAppointmentsService) -> Service {
        appointments_service(
            appointments,
            inject_admin,
            Router::with_path("appointments/calendar/{month}").get(handler),
        )
    }

    #[tokio::test]
    async fn test_calendar_returns_counts() -> TestResult {
        let mut appointments = MockAppointmentsService::new();

        appointments
            .expect_appointment_calendar()
            .once()
            .withf(|_, month| *month == date(2025, 6, 1))
            .return_once(|_, _| {
                Ok(vec![
                    DailyCount {
                        date: date(2025, 6, 3),
                        count: 2,
                    },
                    DailyCount {
                        date: date(2025, 6, 17),
                        count: 1,
                    },
                ])
            });

        let mut res = TestClient::get("http://example.com/appointments/calendar/2025-06")
            .send(&make_service(appointments))
            .await;

        let body: CalendarResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.month, "2025-06");
        assert_eq!(body.days.len(), 2);
        assert_eq!(body.days[0].date, "2025-06-03");
        assert_eq!(body.days[0].count, 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_calendar_bad_month_returns_400() {
        let res = TestClient::get("http://example.com/appointments/calendar/2025-13")
            .send(&make_service(MockAppointmentsService::new()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }
}
