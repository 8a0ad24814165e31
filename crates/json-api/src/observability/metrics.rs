//! Prometheus metrics for the salon API.
//!
//! Besides per-route HTTP counters this tracks two business signals read off
//! the response: booking conflicts on appointment routes and provider webhook
//! deliveries by outcome.

use std::sync::OnceLock;

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
    core::Collector,
};
use salvo::{
    Request, Response, handler,
    http::{
        StatusCode,
        header::{CONTENT_TYPE, HeaderValue},
    },
};
use tracing::error;

const WEBHOOK_ROUTE: &str = "/payments/webhook";

const DURATION_BUCKETS: [f64; 11] = [0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

#[derive(Debug)]
struct SalonMetrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration_seconds: HistogramVec,
    requests_in_flight: IntGauge,
    booking_conflicts_total: IntCounterVec,
    webhook_deliveries_total: IntCounterVec,
}

static METRICS: OnceLock<Option<SalonMetrics>> = OnceLock::new();

/// Counts a request as in flight until dropped.
#[derive(Debug)]
pub(super) struct InFlightRequestGuard(Option<&'static IntGauge>);

impl InFlightRequestGuard {
    pub(super) fn track() -> Self {
        let gauge = metrics().map(|metrics| &metrics.requests_in_flight);

        if let Some(gauge) = gauge {
            gauge.inc();
        }

        Self(gauge)
    }
}

impl Drop for InFlightRequestGuard {
    fn drop(&mut self) {
        if let Some(gauge) = self.0 {
            gauge.dec();
        }
    }
}

/// Record a finished request against its templated `route`.
pub(super) fn observe_request(method: &str, route: &str, status: StatusCode, duration_seconds: f64) {
    let Some(metrics) = metrics() else {
        return;
    };

    let class = status_class(status);

    metrics
        .requests_total
        .with_label_values(&[method, route, class, status.as_str()])
        .inc();

    metrics
        .request_duration_seconds
        .with_label_values(&[method, route])
        .observe(duration_seconds);

    if status == StatusCode::CONFLICT && is_appointment_route(route) {
        metrics
            .booking_conflicts_total
            .with_label_values(&[route])
            .inc();
    }

    if route == WEBHOOK_ROUTE {
        metrics
            .webhook_deliveries_total
            .with_label_values(&[class])
            .inc();
    }
}

#[handler]
pub(crate) async fn metrics_handler(_req: &mut Request, res: &mut Response) {
    let Some(metrics) = metrics() else {
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        return;
    };

    let encoder = TextEncoder::new();
    let mut encoded = Vec::new();

    if let Err(source) = encoder.encode(&metrics.registry.gather(), &mut encoded) {
        error!("failed to encode metrics: {source}");
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);

        return;
    }

    match HeaderValue::from_str(encoder.format_type()) {
        Ok(content_type) => {
            res.headers_mut().insert(CONTENT_TYPE, content_type);
            res.render(String::from_utf8_lossy(&encoded).into_owned());
        }
        Err(source) => {
            error!("invalid metrics content type: {source}");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}

fn metrics() -> Option<&'static SalonMetrics> {
    METRICS.get_or_init(build_metrics).as_ref()
}

/// Create `collector` and add it to `registry`, logging why on failure.
fn register<C>(registry: &Registry, collector: prometheus::Result<C>) -> Option<C>
where
    C: Collector + Clone + 'static,
{
    let registered = collector.and_then(|collector| {
        registry.register(Box::new(collector.clone()))?;

        Ok(collector)
    });

    match registered {
        Ok(collector) => Some(collector),
        Err(source) => {
            error!("failed to register metric: {source}");

            None
        }
    }
}

fn build_metrics() -> Option<SalonMetrics> {
    let registry = match Registry::new_custom(Some("salon_json".to_string()), None) {
        Ok(registry) => registry,
        Err(source) => {
            error!("failed to create metrics registry: {source}");

            return None;
        }
    };

    let requests_total = register(
        &registry,
        IntCounterVec::new(
            Opts::new("http_requests_total", "HTTP requests by method, route and status."),
            &["method", "route", "status_class", "status_code"],
        ),
    )?;

    let request_duration_seconds = register(
        &registry,
        HistogramVec::new(
            HistogramOpts::new("http_request_duration_seconds", "HTTP request latency by route.")
                .buckets(DURATION_BUCKETS.to_vec()),
            &["method", "route"],
        ),
    )?;

    let requests_in_flight = register(
        &registry,
        IntGauge::new("http_requests_in_flight", "HTTP requests currently being served."),
    )?;

    let booking_conflicts_total = register(
        &registry,
        IntCounterVec::new(
            Opts::new(
                "booking_conflicts_total",
                "Appointment requests rejected because the slot or id was already taken.",
            ),
            &["route"],
        ),
    )?;

    let webhook_deliveries_total = register(
        &registry,
        IntCounterVec::new(
            Opts::new(
                "payment_webhook_deliveries_total",
                "Payment provider webhook deliveries by response class.",
            ),
            &["status_class"],
        ),
    )?;

    Some(SalonMetrics {
        registry,
        requests_total,
        request_duration_seconds,
        requests_in_flight,
        booking_conflicts_total,
        webhook_deliveries_total,
    })
}

fn is_appointment_route(route: &str) -> bool {
    route == "/appointments" || route.starts_with("/appointments/")
}

fn status_class(status: StatusCode) -> &'static str {
    match status.as_u16() {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}

#[cfg(test)]
mod tests {
    use salvo::{
        Router, Service,
        test::{ResponseExt, TestClient},
    };
    use serde_json::json;
    use testresult::TestResult;
    use uuid::Uuid;

    use salon_app::domain::appointments::{AppointmentsServiceError, MockAppointmentsService};

    use crate::{
        appointments,
        observability::request_logging,
        test_helpers::{appointments_router, inject_customer},
    };

    use super::*;

    #[tokio::test]
    async fn slot_conflict_is_counted_as_a_booking_conflict() -> TestResult {
        let mut mock = MockAppointmentsService::new();

        mock.expect_create_appointment()
            .once()
            .return_once(|_, _, _| Err(AppointmentsServiceError::SlotTaken));

        let service = Service::new(
            Router::new()
                .hoop(request_logging)
                .push(Router::with_path("metrics").get(metrics_handler))
                .push(appointments_router(
                    mock,
                    inject_customer,
                    Router::with_path("appointments").post(appointments::create::handler),
                )),
        );

        let booking = TestClient::post("http://example.com/appointments")
            .json(&json!({
                "serviceId": Uuid::now_v7(),
                "serviceName": "Haircut",
                "date": "2025-06-01",
                "timeSlot": "10:00",
                "price": 2500,
            }))
            .send(&service)
            .await;

        assert_eq!(booking.status_code, Some(StatusCode::CONFLICT));

        let exposition = TestClient::get("http://example.com/metrics")
            .send(&service)
            .await
            .take_string()
            .await?;

        assert!(
            exposition.contains(r#"salon_json_booking_conflicts_total{route="/appointments"}"#),
            "expected a booking conflict sample, got:\n{exposition}"
        );
        assert!(
            exposition.contains(r#"route="/appointments",status_class="4xx",status_code="409""#),
            "expected the 409 in the request counter, got:\n{exposition}"
        );

        Ok(())
    }

    #[test]
    fn only_appointment_routes_count_as_bookings() {
        assert!(is_appointment_route("/appointments"));
        assert!(is_appointment_route("/appointments/{id}"));
        assert!(!is_appointment_route("/admin/appointments/{id}"));
        assert!(!is_appointment_route("/appointmentsx"));
    }

    #[test]
    fn statuses_are_grouped_by_class() {
        assert_eq!(status_class(StatusCode::CREATED), "2xx");
        assert_eq!(status_class(StatusCode::CONFLICT), "4xx");
        assert_eq!(status_class(StatusCode::BAD_GATEWAY), "5xx");
    }
}
