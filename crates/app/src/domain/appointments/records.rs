//! Appointment Records

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use jiff::{Timestamp, civil::Date};
use thiserror::Error;

use crate::{domain::appointments::schedule::TimeSlot, uuids::TypedUuid};

/// Appointment UUID
pub type AppointmentUuid = TypedUuid<AppointmentRecord>;

/// Customer marker; customers live in the identity provider, not here.
#[derive(Debug)]
pub struct Customer;

/// Customer UUID, the `sub` claim of a verified bearer token.
pub type CustomerUuid = TypedUuid<Customer>;

/// Catalog service marker.
#[derive(Debug)]
pub struct Service;

/// Service UUID
pub type ServiceUuid = TypedUuid<Service>;

/// Appointment Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentRecord {
    pub uuid: AppointmentUuid,
    pub customer_uuid: CustomerUuid,
    pub customer_email: String,
    pub service_uuid: ServiceUuid,
    pub service_name: String,
    pub date: Date,
    pub time_slot: TimeSlot,
    pub price: u64,
    pub status: AppointmentStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl AppointmentRecord {
    #[must_use]
    pub fn is_owned_by(&self, customer: CustomerUuid) -> bool {
        self.customer_uuid == customer
    }

    /// Whether the appointment can still be paid for.
    #[must_use]
    pub fn is_payable(&self) -> bool {
        self.payment_status == PaymentStatus::Unpaid && self.status != AppointmentStatus::Cancelled
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} value `{value}`")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Appointment lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl Display for AppointmentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(UnknownVariant::new("appointment status", value)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentStatus {
    Unpaid,
    Paid,
}

impl PaymentStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Paid => "paid",
        }
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "unpaid" => Ok(Self::Unpaid),
            "paid" => Ok(Self::Paid),
            _ => Err(UnknownVariant::new("payment status", value)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    Card,
    Cash,
}

impl PaymentMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Cash => "cash",
        }
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "card" => Ok(Self::Card),
            "cash" => Ok(Self::Cash),
            _ => Err(UnknownVariant::new("payment method", value)),
        }
    }
}
