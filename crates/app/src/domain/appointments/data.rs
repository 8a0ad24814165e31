//! Appointments Data

use jiff::civil::Date;

use crate::domain::appointments::{
    records::{AppointmentUuid, PaymentMethod, ServiceUuid},
    schedule::TimeSlot,
};

/// Longest accepted booking note, in characters.
pub const MAX_NOTES_CHARS: usize = 500;

/// New Appointment Data
///
/// The customer and their email come from the verified actor, never the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppointment {
    pub uuid: AppointmentUuid,
    pub service_uuid: ServiceUuid,
    pub service_name: String,
    pub date: Date,
    pub time_slot: TimeSlot,
    pub price: u64,
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
}

/// Admin listing filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentFilter {
    pub date: Option<Date>,
    pub customer_email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available,
    Conflict,
}

impl Availability {
    #[must_use]
    pub const fn is_available(self) -> bool {
        matches!(self, Self::Available)
    }
}

/// Number of live appointments on a calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyCount {
    pub date: Date,
    pub count: u64,
}
