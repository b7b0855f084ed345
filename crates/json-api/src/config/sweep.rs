//! Sweep Config

use brew_orders_app::domain::orders::SweepSchedule;
use clap::{ArgAction, Args};
use jiff::{civil::Time, tz::TimeZone};

/// Nightly order sweep settings.
#[derive(Debug, Args)]
pub struct SweepConfig {
    /// Run the nightly sweep in this process.
    #[arg(
        long = "sweep-enabled",
        env = "SWEEP_ENABLED",
        default_value_t = true,
        action = ArgAction::Set
    )]
    pub enabled: bool,

    /// Local time the sweep fires.
    #[arg(long = "sweep-at", env = "SWEEP_AT", default_value = "02:00:00")]
    pub fire_at: Time,

    /// Local time on the previous day when the sweep window opens.
    #[arg(
        long = "sweep-window-opens-at",
        env = "SWEEP_WINDOW_OPENS_AT",
        default_value = "14:00:00"
    )]
    pub window_opens_at: Time,

    /// IANA time zone for the schedule; the system zone when unset.
    #[arg(long = "sweep-time-zone", env = "SWEEP_TIME_ZONE")]
    pub time_zone: Option<String>,

    /// Sweep the most recent window once on startup.
    #[arg(
        long = "sweep-catch-up",
        env = "SWEEP_CATCH_UP",
        default_value_t = true,
        action = ArgAction::Set
    )]
    pub catch_up: bool,
}

impl SweepConfig {
    /// Build the sweep schedule.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured time zone is unknown.
    pub fn schedule(&self) -> Result<SweepSchedule, jiff::Error> {
        let time_zone = match self.time_zone.as_deref() {
            Some(name) => TimeZone::get(name)?,
            None => TimeZone::system(),
        };

        Ok(SweepSchedule {
            fire_at: self.fire_at,
            window_opens_at: self.window_opens_at,
            time_zone,
        })
    }
}
