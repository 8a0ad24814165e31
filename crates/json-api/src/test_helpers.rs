//! Test helpers.

use std::sync::Arc;

use jiff::{Timestamp, civil::date};
use salon_app::{
    auth::{Actor, MockAuthService},
    context::AppContext,
    domain::{
        appointments::{
            MockAppointmentsService,
            records::{
                AppointmentRecord, AppointmentStatus, AppointmentUuid, CustomerUuid,
                PaymentStatus, ServiceUuid,
            },
            schedule::{ScheduleError, TimeSlot},
        },
        payments::MockPaymentsService,
    },
};
use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;

use crate::{extensions::*, state::State};

pub(crate) const TEST_CUSTOMER_UUID: CustomerUuid = CustomerUuid::from_uuid(Uuid::nil());

pub(crate) fn test_customer() -> Actor {
    Actor::customer(TEST_CUSTOMER_UUID, "jane@example.com")
}

pub(crate) fn test_admin() -> Actor {
    Actor::admin(TEST_CUSTOMER_UUID, "admin@example.com")
}

#[salvo::handler]
pub(crate) async fn inject_customer(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    depot.insert_actor(test_customer());
    ctrl.call_next(req, depot, res).await;
}

#[salvo::handler]
pub(crate) async fn inject_admin(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    depot.insert_actor(test_admin());
    ctrl.call_next(req, depot, res).await;
}

/// A booked appointment owned by [`TEST_CUSTOMER_UUID`].
pub(crate) fn make_appointment(uuid: AppointmentUuid) -> Result<AppointmentRecord, ScheduleError> {
    Ok(AppointmentRecord {
        uuid,
        customer_uuid: TEST_CUSTOMER_UUID,
        customer_email: "jane@example.com".to_string(),
        service_uuid: ServiceUuid::from_uuid(Uuid::nil()),
        service_name: "Haircut".to_string(),
        date: date(2025, 6, 1),
        time_slot: TimeSlot::new(10, 0)?,
        price: 2500,
        status: AppointmentStatus::Pending,
        payment_status: PaymentStatus::Unpaid,
        payment_method: None,
        notes: None,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    })
}

fn strict_auth_mock() -> MockAuthService {
    let mut auth = MockAuthService::new();

    auth.expect_authenticate_bearer().never();

    auth
}

fn strict_appointments_mock() -> MockAppointmentsService {
    let mut appointments = MockAppointmentsService::new();

    appointments.expect_check_availability().never();
    appointments.expect_create_appointment().never();
    appointments.expect_get_appointment().never();
    appointments.expect_list_my_appointments().never();
    appointments.expect_list_appointments().never();
    appointments.expect_appointment_calendar().never();
    appointments.expect_transition().never();

    appointments
}

fn strict_payments_mock() -> MockPaymentsService {
    let mut payments = MockPaymentsService::new();

    payments.expect_list_unpaid().never();
    payments.expect_confirm_cash_payment().never();
    payments.expect_create_checkout_intent().never();
    payments.expect_confirm_checkout().never();
    payments.expect_verify_checkout().never();
    payments.expect_handle_webhook().never();

    payments
}

fn state(
    appointments: MockAppointmentsService,
    payments: MockPaymentsService,
    auth: MockAuthService,
) -> Arc<State> {
    State::from_app_context(AppContext {
        appointments: Arc::new(appointments),
        payments: Arc::new(payments),
        auth: Arc::new(auth),
    })
}

pub(crate) fn state_with_auth(auth: MockAuthService) -> Arc<State> {
    state(strict_appointments_mock(), strict_payments_mock(), auth)
}

pub(crate) fn appointments_router(
    appointments: MockAppointmentsService,
    actor: impl Handler,
    route: Router,
) -> Router {
    Router::new()
        .hoop(inject(state(
            appointments,
            strict_payments_mock(),
            strict_auth_mock(),
        )))
        .hoop(actor)
        .push(route)
}

pub(crate) fn appointments_service(
    appointments: MockAppointmentsService,
    actor: impl Handler,
    route: Router,
) -> Service {
    Service::new(appointments_router(appointments, actor, route))
}

pub(crate) fn payments_service(
    payments: MockPaymentsService,
    actor: impl Handler,
    route: Router,
) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state(
                strict_appointments_mock(),
                payments,
                strict_auth_mock(),
            )))
            .hoop(actor)
            .push(route),
    )
}

/// A service with no actor injected, for public routes.
pub(crate) fn public_payments_service(payments: MockPaymentsService, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state(
                strict_appointments_mock(),
                payments,
                strict_auth_mock(),
            )))
            .push(route),
    )
}
