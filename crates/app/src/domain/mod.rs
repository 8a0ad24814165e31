//! Salon Domain Concerns

pub mod appointments;
pub mod payments;
