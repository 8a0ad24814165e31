//! Test Helpers

use jiff::{Timestamp, civil::Date};
use testresult::TestResult;

use crate::{
    auth::Actor,
    domain::appointments::{
        AppointmentsService,
        data::NewAppointment,
        records::{
            AppointmentRecord, AppointmentStatus, AppointmentUuid, CustomerUuid, PaymentStatus,
            ServiceUuid,
        },
        schedule::TimeSlot,
    },
    test::TestContext,
};

/// A moment safely before every date the tests book.
pub(crate) fn test_now() -> Result<Timestamp, jiff::Error> {
    "2025-05-01T08:00:00Z".parse()
}

pub(crate) fn customer(email: &str) -> Actor {
    Actor::customer(CustomerUuid::new(), email)
}

pub(crate) fn admin() -> Actor {
    Actor::admin(CustomerUuid::new(), "admin@example.com")
}

pub(crate) fn new_appointment(
    service: ServiceUuid,
    date: Date,
    time_slot: &str,
) -> TestResult<NewAppointment> {
    Ok(NewAppointment {
        uuid: AppointmentUuid::new(),
        service_uuid: service,
        service_name: "Haircut".to_string(),
        date,
        time_slot: time_slot.parse()?,
        price: 2500,
        payment_method: None,
        notes: None,
    })
}

/// Book a slot through the service as `actor`.
pub(crate) async fn book(
    ctx: &TestContext,
    actor: &Actor,
    service: ServiceUuid,
    date: Date,
    time_slot: &str,
) -> TestResult<AppointmentRecord> {
    let booking = new_appointment(service, date, time_slot)?;

    let created = ctx
        .appointments
        .create_appointment(actor, booking, test_now()?)
        .await?;

    Ok(created)
}

/// An in-memory pending appointment for pure decision tests.
pub(crate) fn make_appointment(date: Date, time_slot: TimeSlot) -> AppointmentRecord {
    let created_at = Timestamp::UNIX_EPOCH;

    AppointmentRecord {
        uuid: AppointmentUuid::new(),
        customer_uuid: CustomerUuid::new(),
        customer_email: "owner@example.com".to_string(),
        service_uuid: ServiceUuid::new(),
        service_name: "Haircut".to_string(),
        date,
        time_slot,
        price: 2500,
        status: AppointmentStatus::Pending,
        payment_status: PaymentStatus::Unpaid,
        payment_method: None,
        notes: None,
        created_at,
        updated_at: created_at,
    }
}
