//! Payment Handlers

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use salon_app::domain::payments::records::AppointmentUuids;

pub(crate) mod cash;
pub(crate) mod checkout;
pub(crate) mod pay_with_cash;
pub(crate) mod unpaid;
pub(crate) mod verify;
pub(crate) mod webhook;

/// Appointments Selection Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AppointmentIdsRequest {
    /// Appointments to pay for
    pub appointment_ids: Vec<Uuid>,
}

impl From<AppointmentIdsRequest> for AppointmentUuids {
    fn from(request: AppointmentIdsRequest) -> Self {
        request.appointment_ids.into_iter().map(Into::into).collect()
    }
}

/// Cash Payment Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CashPaymentResponse {
    /// Appointments marked paid by this request
    pub updated: u64,
}
