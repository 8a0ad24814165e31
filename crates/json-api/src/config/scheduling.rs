//! Scheduling Config

use clap::Args;
use jiff::tz::TimeZone;

/// Salon calendar settings.
#[derive(Debug, Args)]
pub struct SchedulingConfig {
    /// IANA time zone the salon's time slots are expressed in
    #[arg(long, env = "SALON_TIME_ZONE", default_value = "UTC")]
    pub salon_time_zone: String,
}

impl SchedulingConfig {
    /// Resolve the configured time zone.
    ///
    /// # Errors
    ///
    /// Returns an error when the name is not in the time zone database.
    pub fn time_zone(&self) -> Result<TimeZone, jiff::Error> {
        TimeZone::get(&self.salon_time_zone)
    }
}
