//! Cancellation window guard.

use std::fmt::{Display, Formatter, Result as FmtResult};

use jiff::{SignedDuration, Timestamp, tz::TimeZone};

use crate::{
    auth::Actor,
    domain::appointments::{
        records::AppointmentRecord,
        schedule::{ScheduleError, appointment_instant},
    },
};

/// Minimum notice an owner must give to cancel or reschedule.
pub const CANCELLATION_WINDOW: SignedDuration = SignedDuration::from_hours(24);

/// Why an actor may not act on an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForbiddenReason {
    NotOwner,
    AdminOnly,
    InsideCancellationWindow,
}

impl ForbiddenReason {
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotOwner => "You are not allowed to access this appointment",
            Self::AdminOnly => "Only an administrator can perform this action",
            Self::InsideCancellationWindow => {
                "You can only cancel or reschedule appointments at least 24 hours in advance"
            }
        }
    }
}

impl Display for ForbiddenReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.message())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowDecision {
    Allowed,
    Denied(ForbiddenReason),
}

/// Decide whether `actor` may cancel or reschedule `appointment` at `now`.
///
/// Admins always may. Owners may while the appointment instant, read in `tz`,
/// is at least [`CANCELLATION_WINDOW`] away. Everyone else is denied.
///
/// # Errors
///
/// Returns an error when the appointment instant cannot be resolved in `tz`.
pub fn can_cancel_or_reschedule(
    appointment: &AppointmentRecord,
    actor: &Actor,
    now: Timestamp,
    tz: &TimeZone,
) -> Result<WindowDecision, ScheduleError> {
    if actor.is_admin {
        return Ok(WindowDecision::Allowed);
    }

    if !appointment.is_owned_by(actor.uuid) {
        return Ok(WindowDecision::Denied(ForbiddenReason::NotOwner));
    }

    let instant = appointment_instant(appointment.date, appointment.time_slot, tz)?;

    if instant.duration_since(now) >= CANCELLATION_WINDOW {
        Ok(WindowDecision::Allowed)
    } else {
        Ok(WindowDecision::Denied(
            ForbiddenReason::InsideCancellationWindow,
        ))
    }
}
