//! App Context

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use jiff::tz::TimeZone;
use thiserror::Error;

use crate::{
    auth::{AuthService, JwtAuthService},
    database::{self, Db},
    domain::{
        appointments::{AppointmentsService, PgAppointmentsService},
        payments::{PaymentSettings, PaymentsService, PgPaymentsService, StripeClient, StripeConfig},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to run database migrations")]
    Migrate(#[source] sqlx::migrate::MigrateError),
}

/// Everything needed to wire the services together.
#[derive(Clone)]
pub struct AppSettings {
    /// HS256 secret shared with the identity service.
    pub jwt_secret: String,

    /// Time zone the salon's wall-clock slots are in.
    pub time_zone: TimeZone,

    pub stripe: StripeConfig,

    pub payments: PaymentSettings,

    /// Apply pending migrations at startup.
    pub run_migrations: bool,
}

impl Debug for AppSettings {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("AppSettings")
            .field("jwt_secret", &"**redacted**")
            .field("time_zone", &self.time_zone.iana_name())
            .field("stripe", &self.stripe)
            .field("payments", &self.payments)
            .field("run_migrations", &self.run_migrations)
            .finish()
    }
}

#[derive(Clone)]
pub struct AppContext {
    pub appointments: Arc<dyn AppointmentsService>,
    pub payments: Arc<dyn PaymentsService>,
    pub auth: Arc<dyn AuthService>,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection or migrating fails.
    pub async fn from_database_url(url: &str, settings: AppSettings) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        if settings.run_migrations {
            database::migrate(&pool)
                .await
                .map_err(AppInitError::Migrate)?;
        }

        let db = Db::new(pool);

        let provider = StripeClient::new(settings.stripe);

        Ok(Self {
            appointments: Arc::new(PgAppointmentsService::new(
                db.clone(),
                settings.time_zone,
            )),
            payments: Arc::new(PgPaymentsService::new(
                db,
                Arc::new(provider),
                settings.payments,
            )),
            auth: Arc::new(JwtAuthService::new(settings.jwt_secret.as_bytes())),
        })
    }
}
