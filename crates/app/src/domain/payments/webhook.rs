//! Signed provider webhooks.
//!
//! The signature header has the form `t=<unix seconds>,v1=<hex>[,v1=<hex>...]`,
//! where each `v1` is an HMAC-SHA256 of `"{t}.{payload}"` keyed by the endpoint secret.

use hmac::{Hmac, Mac};
use jiff::{SignedDuration, Timestamp};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Maximum clock distance between the signed timestamp and now.
pub const SIGNATURE_TOLERANCE: SignedDuration = SignedDuration::from_secs(300);

/// Event type that finalizes a card payment.
pub const CHECKOUT_COMPLETED: &str = "checkout.session.completed";

/// Event type for delayed payment methods that settle after checkout.
pub const CHECKOUT_ASYNC_PAYMENT_SUCCEEDED: &str = "checkout.session.async_payment_succeeded";

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("webhook signature header is malformed")]
    MalformedSignature,

    #[error("webhook signature does not match")]
    InvalidSignature,

    #[error("webhook timestamp is outside the tolerance window")]
    StaleTimestamp,

    #[error("webhook payload is not a valid event")]
    MalformedPayload(#[source] serde_json::Error),
}

/// Verify a webhook signature header against the raw request body.
///
/// # Errors
///
/// Returns a [`WebhookError`] when the header cannot be parsed, the timestamp
/// is outside [`SIGNATURE_TOLERANCE`] or no `v1` signature matches.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &[u8],
    now: Timestamp,
) -> Result<(), WebhookError> {
    let mut signed_at = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let (key, value) = part
            .trim()
            .split_once('=')
            .ok_or(WebhookError::MalformedSignature)?;

        match key {
            "t" => {
                signed_at = Some(
                    value
                        .parse::<i64>()
                        .map_err(|_| WebhookError::MalformedSignature)?,
                );
            }
            "v1" => {
                signatures.push(hex::decode(value).map_err(|_| WebhookError::MalformedSignature)?);
            }
            _ => {}
        }
    }

    let signed_at = signed_at.ok_or(WebhookError::MalformedSignature)?;

    if signatures.is_empty() {
        return Err(WebhookError::MalformedSignature);
    }

    let signed_at =
        Timestamp::from_second(signed_at).map_err(|_| WebhookError::MalformedSignature)?;

    if now.duration_since(signed_at).abs() > SIGNATURE_TOLERANCE {
        return Err(WebhookError::StaleTimestamp);
    }

    let mut mac =
        HmacSha256::new_from_slice(secret).map_err(|_| WebhookError::InvalidSignature)?;

    mac.update(signed_at.as_second().to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);

    if signatures
        .iter()
        .any(|signature| mac.clone().verify_slice(signature).is_ok())
    {
        Ok(())
    } else {
        Err(WebhookError::InvalidSignature)
    }
}

/// A provider event, reduced to the fields reconciliation reads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WebhookEvent {
    pub id: String,

    #[serde(rename = "type")]
    pub event_type: String,

    pub data: WebhookEventData,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WebhookEventData {
    pub object: WebhookEventObject,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WebhookEventObject {
    pub id: String,

    #[serde(default)]
    pub payment_status: Option<String>,
}

impl WebhookEvent {
    /// The checkout session to reconcile, when this event confirms a payment.
    #[must_use]
    pub fn paid_checkout_session(&self) -> Option<&str> {
        let paid = self.data.object.payment_status.as_deref() == Some("paid");

        match self.event_type.as_str() {
            CHECKOUT_COMPLETED | CHECKOUT_ASYNC_PAYMENT_SUCCEEDED if paid => {
                Some(&self.data.object.id)
            }
            _ => None,
        }
    }
}

/// Parse a verified payload.
///
/// # Errors
///
/// Returns [`WebhookError::MalformedPayload`] when the body is not an event.
pub fn parse_event(payload: &[u8]) -> Result<WebhookEvent, WebhookError> {
    serde_json::from_slice(payload).map_err(WebhookError::MalformedPayload)
}

#[cfg(test)]
pub(crate) fn sign(payload: &[u8], secret: &[u8], signed_at: Timestamp) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("hmac accepts keys of any length");

    mac.update(signed_at.as_second().to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);

    format!(
        "t={},v1={}",
        signed_at.as_second(),
        hex::encode(mac.finalize().into_bytes())
    )
}
