//! Appointment status transitions.

use std::fmt::{Display, Formatter, Result as FmtResult};

use jiff::{Timestamp, civil::Date, tz::TimeZone};

use crate::{
    auth::Actor,
    domain::appointments::{
        errors::AppointmentsServiceError,
        records::{AppointmentRecord, AppointmentStatus},
        schedule::TimeSlot,
        window::{ForbiddenReason, WindowDecision, can_cancel_or_reschedule},
    },
};

/// An event applied to an existing appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Approve,
    Cancel,
    Complete,
    /// Physical removal.
    Delete,
    /// Move to another date and slot of the same service.
    Reschedule { date: Date, time_slot: TimeSlot },
}

impl Transition {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Cancel => "cancel",
            Self::Complete => "complete",
            Self::Delete => "delete",
            Self::Reschedule { .. } => "reschedule",
        }
    }

    /// Status after the transition; `None` when the row is removed.
    #[must_use]
    pub const fn target(self) -> Option<AppointmentStatus> {
        match self {
            Self::Approve => Some(AppointmentStatus::Confirmed),
            Self::Cancel => Some(AppointmentStatus::Cancelled),
            Self::Complete => Some(AppointmentStatus::Completed),
            Self::Delete => None,
            Self::Reschedule { .. } => Some(AppointmentStatus::Pending),
        }
    }

    #[must_use]
    pub const fn is_admin_only(self) -> bool {
        matches!(self, Self::Approve | Self::Complete | Self::Delete)
    }

    /// Owners performing these are subject to the cancellation window.
    #[must_use]
    pub const fn is_window_guarded(self) -> bool {
        matches!(self, Self::Cancel | Self::Reschedule { .. })
    }

    #[must_use]
    pub const fn is_allowed_from(self, from: AppointmentStatus) -> bool {
        use AppointmentStatus::{Confirmed, Pending};

        match self {
            Self::Approve | Self::Reschedule { .. } => matches!(from, Pending),
            Self::Cancel | Self::Delete => matches!(from, Pending | Confirmed),
            Self::Complete => matches!(from, Confirmed),
        }
    }
}

impl Display for Transition {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}

/// Check whether `actor` may apply `transition` to `appointment` at `now`.
///
/// Checks run in order: ownership, admin-only events, reachability from the
/// current status, then the cancellation window for owners.
///
/// # Errors
///
/// Returns [`AppointmentsServiceError::Forbidden`] or
/// [`AppointmentsServiceError::InvalidTransition`] when the transition must not happen.
pub fn authorize(
    appointment: &AppointmentRecord,
    transition: Transition,
    actor: &Actor,
    now: Timestamp,
    tz: &TimeZone,
) -> Result<(), AppointmentsServiceError> {
    if !actor.is_admin {
        if !appointment.is_owned_by(actor.uuid) {
            return Err(AppointmentsServiceError::Forbidden(ForbiddenReason::NotOwner));
        }

        if transition.is_admin_only() {
            return Err(AppointmentsServiceError::Forbidden(
                ForbiddenReason::AdminOnly,
            ));
        }
    }

    if !transition.is_allowed_from(appointment.status) {
        return Err(AppointmentsServiceError::InvalidTransition {
            from: appointment.status,
            transition,
        });
    }

    if transition.is_window_guarded()
        && let WindowDecision::Denied(reason) =
            can_cancel_or_reschedule(appointment, actor, now, tz)?
    {
        return Err(AppointmentsServiceError::Forbidden(reason));
    }

    Ok(())
}
