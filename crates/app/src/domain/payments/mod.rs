//! Payments

pub mod errors;
pub mod provider;
pub mod records;
mod repository;
pub mod service;
pub mod webhook;

pub use errors::PaymentsServiceError;
pub use provider::{MockPaymentProvider, PaymentProvider, StripeClient, StripeConfig};
pub use service::*;
