//! Appointments

pub mod data;
pub mod errors;
pub mod records;
mod repository;
pub mod schedule;
pub mod service;
pub mod transitions;
pub mod window;

pub use errors::AppointmentsServiceError;
pub use service::*;
