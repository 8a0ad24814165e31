//! Payments Config

use clap::Args;
use salon_app::domain::payments::{PaymentSettings, StripeConfig};

/// Hosted checkout provider settings.
#[derive(Debug, Args)]
pub struct PaymentsConfig {
    /// Checkout API base URL
    #[arg(long, env = "STRIPE_API_BASE", default_value = "https://api.stripe.com")]
    pub stripe_api_base: String,

    /// Checkout API secret key
    #[arg(long, env = "STRIPE_SECRET_KEY", hide_env_values = true)]
    pub stripe_secret_key: String,

    /// Webhook endpoint signing secret
    #[arg(long, env = "STRIPE_WEBHOOK_SECRET", hide_env_values = true)]
    pub stripe_webhook_secret: String,

    /// Redirect after a successful checkout
    #[arg(
        long,
        env = "CHECKOUT_SUCCESS_URL",
        default_value = "http://localhost:3000/payment/success?session_id={CHECKOUT_SESSION_ID}"
    )]
    pub success_url: String,

    /// Redirect after an abandoned checkout
    #[arg(
        long,
        env = "CHECKOUT_CANCEL_URL",
        default_value = "http://localhost:3000/payment/cancel"
    )]
    pub cancel_url: String,

    /// ISO currency code for checkout prices
    #[arg(long, env = "CHECKOUT_CURRENCY", default_value = "eur")]
    pub currency: String,
}

impl PaymentsConfig {
    /// Provider client settings.
    #[must_use]
    pub fn stripe_config(&self) -> StripeConfig {
        StripeConfig {
            api_base: self.stripe_api_base.clone(),
            secret_key: self.stripe_secret_key.clone(),
            success_url: self.success_url.clone(),
            cancel_url: self.cancel_url.clone(),
        }
    }

    /// Checkout currency and webhook verification settings.
    #[must_use]
    pub fn payment_settings(&self) -> PaymentSettings {
        PaymentSettings {
            currency: self.currency.to_ascii_lowercase(),
            webhook_secret: self.stripe_webhook_secret.clone(),
        }
    }
}
