//! Appointment scheduling primitives.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use jiff::{
    Timestamp,
    civil::{Date, Time},
    tz::TimeZone,
};
use thiserror::Error;

use crate::domain::appointments::records::ServiceUuid;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("time slot must be formatted as HH:MM")]
    InvalidTimeSlot,

    #[error("date must be formatted as YYYY-MM-DD")]
    InvalidDate,

    #[error("month must be formatted as YYYY-MM")]
    InvalidMonth,

    #[error("appointment time does not exist in the salon time zone")]
    UnresolvableInstant(#[source] jiff::Error),
}

/// A zero-padded 24-hour `HH:MM` booking slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSlot {
    hour: i8,
    minute: i8,
}

impl TimeSlot {
    /// Build a slot from its components.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidTimeSlot`] when either component is out of range.
    pub fn new(hour: i8, minute: i8) -> Result<Self, ScheduleError> {
        if !(0..24).contains(&hour) || !(0..60).contains(&minute) {
            return Err(ScheduleError::InvalidTimeSlot);
        }

        Ok(Self { hour, minute })
    }

    /// Civil time of day at the start of the slot.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidTimeSlot`] if the components are out of range.
    pub fn to_time(self) -> Result<Time, ScheduleError> {
        Time::new(self.hour, self.minute, 0, 0).map_err(|_| ScheduleError::InvalidTimeSlot)
    }
}

impl Display for TimeSlot {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeSlot {
    type Err = ScheduleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (hour, minute) = value
            .split_once(':')
            .ok_or(ScheduleError::InvalidTimeSlot)?;

        Self::new(two_digits(hour)?, two_digits(minute)?)
    }
}

fn two_digits(part: &str) -> Result<i8, ScheduleError> {
    if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ScheduleError::InvalidTimeSlot);
    }

    part.parse().map_err(|_| ScheduleError::InvalidTimeSlot)
}

/// The identity of a bookable slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotKey {
    pub service_uuid: ServiceUuid,
    pub date: Date,
    pub time_slot: TimeSlot,
}

/// Parse an ISO `YYYY-MM-DD` calendar date.
///
/// # Errors
///
/// Returns [`ScheduleError::InvalidDate`] for anything else.
pub fn parse_date(value: &str) -> Result<Date, ScheduleError> {
    if value.len() != 10 {
        return Err(ScheduleError::InvalidDate);
    }

    value.parse().map_err(|_| ScheduleError::InvalidDate)
}

/// Parse a `YYYY-MM` month into the first day of that month.
///
/// # Errors
///
/// Returns [`ScheduleError::InvalidMonth`] for anything else.
pub fn parse_month(value: &str) -> Result<Date, ScheduleError> {
    if value.len() != 7 {
        return Err(ScheduleError::InvalidMonth);
    }

    format!("{value}-01")
        .parse()
        .map_err(|_| ScheduleError::InvalidMonth)
}

/// Resolve a booked date and slot to an absolute instant in the salon time zone.
///
/// Civil times repeated or skipped by a DST change use jiff's compatible disambiguation.
///
/// # Errors
///
/// Returns an error when the civil time cannot be placed in `tz`.
pub fn appointment_instant(
    date: Date,
    time_slot: TimeSlot,
    tz: &TimeZone,
) -> Result<Timestamp, ScheduleError> {
    let zoned = date
        .to_datetime(time_slot.to_time()?)
        .to_zoned(tz.clone())
        .map_err(ScheduleError::UnresolvableInstant)?;

    Ok(zoned.timestamp())
}
