//! Checkout provider client.

use async_trait::async_trait;
use mockall::automock;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::payments::records::AppointmentUuids;

/// Configuration for the hosted checkout API.
#[derive(Clone)]
pub struct StripeConfig {
    /// API base, e.g. `"https://api.stripe.com"`.
    pub api_base: String,

    /// Secret API key.
    pub secret_key: String,

    /// Where the provider redirects after payment. `{CHECKOUT_SESSION_ID}` is
    /// substituted by the provider.
    pub success_url: String,

    pub cancel_url: String,
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("api_base", &self.api_base)
            .field("secret_key", &"**redacted**")
            .field("success_url", &self.success_url)
            .field("cancel_url", &self.cancel_url)
            .finish()
    }
}

/// One priced line on a checkout page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub name: String,
    pub unit_amount: u64,
}

/// Checkout session creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub customer_email: String,
    pub currency: String,
    pub line_items: Vec<LineItem>,
    pub appointment_uuids: AppointmentUuids,
}

/// Provider view of a checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderSession {
    pub id: String,

    #[serde(default)]
    pub url: Option<String>,

    /// `paid`, `unpaid` or `no_payment_required`.
    pub payment_status: String,
}

impl ProviderSession {
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.payment_status == "paid"
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response from payment provider: {0}")]
    UnexpectedResponse(String),
}

#[automock]
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Open a hosted checkout session.
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<ProviderSession, ProviderError>;

    /// Fetch the current state of a checkout session.
    async fn retrieve_checkout_session(
        &self,
        reference: &str,
    ) -> Result<ProviderSession, ProviderError>;
}

/// HTTP client for the Stripe checkout sessions API.
#[derive(Debug, Clone)]
pub struct StripeClient {
    config: StripeConfig,
    http: Client,
}

impl StripeClient {
    #[must_use]
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    fn session_form(&self, request: &CheckoutRequest) -> Vec<(String, String)> {
        let appointment_ids = request
            .appointment_uuids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");

        let mut form = vec![
            ("mode".to_string(), "payment".to_string()),
            ("success_url".to_string(), self.config.success_url.clone()),
            ("cancel_url".to_string(), self.config.cancel_url.clone()),
            ("customer_email".to_string(), request.customer_email.clone()),
            ("metadata[appointmentIds]".to_string(), appointment_ids),
        ];

        for (index, item) in request.line_items.iter().enumerate() {
            let prefix = format!("line_items[{index}]");

            form.push((format!("{prefix}[quantity]"), "1".to_string()));
            form.push((
                format!("{prefix}[price_data][currency]"),
                request.currency.clone(),
            ));
            form.push((
                format!("{prefix}[price_data][unit_amount]"),
                item.unit_amount.to_string(),
            ));
            form.push((
                format!("{prefix}[price_data][product_data][name]"),
                item.name.clone(),
            ));
        }

        form
    }

    async fn parse_session(response: reqwest::Response) -> Result<ProviderSession, ProviderError> {
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(ProviderError::UnexpectedResponse(format!(
                "request failed with status {status}: {text}"
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl PaymentProvider for StripeClient {
    #[tracing::instrument(
        name = "payments.provider.create_checkout_session",
        skip(self, request),
        fields(line_items = request.line_items.len()),
        err
    )]
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<ProviderSession, ProviderError> {
        let url = format!("{}/v1/checkout/sessions", self.config.api_base);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.secret_key)
            .form(&self.session_form(&request))
            .send()
            .await?;

        Self::parse_session(response).await
    }

    #[tracing::instrument(
        name = "payments.provider.retrieve_checkout_session",
        skip(self),
        err
    )]
    async fn retrieve_checkout_session(
        &self,
        reference: &str,
    ) -> Result<ProviderSession, ProviderError> {
        let url = format!(
            "{}/v1/checkout/sessions/{reference}",
            self.config.api_base
        );

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.config.secret_key)
            .send()
            .await?;

        Self::parse_session(response).await
    }
}
