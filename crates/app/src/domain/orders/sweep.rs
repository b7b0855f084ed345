//! Order sweep
//!
//! Every night at `fire_at` local time, carts created between `window_opens_at`
//! on the previous day and the fire time are promoted to
//! `READY_FOR_DELIVERY`.

use std::{sync::Arc, time::Duration};

use jiff::{
    Timestamp,
    civil::{Date, Time, time},
    tz::TimeZone,
};
use tokio::{task::JoinHandle, time::sleep};
use tracing::{debug, error, info};

use crate::domain::orders::{models::SweepReport, service::OrdersService};

/// Half-open `[start, end)` range of cart creation times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepWindow {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl SweepWindow {
    #[must_use]
    pub fn contains(&self, at: Timestamp) -> bool {
        self.start <= at && at < self.end
    }
}

/// When the sweep fires and which creation times it covers.
#[derive(Debug, Clone)]
pub struct SweepSchedule {
    pub fire_at: Time,

    /// Wall-clock time on the day before the fire date when the window opens.
    pub window_opens_at: Time,
    pub time_zone: TimeZone,
}

impl Default for SweepSchedule {
    fn default() -> Self {
        Self {
            fire_at: time(2, 0, 0, 0),
            window_opens_at: time(14, 0, 0, 0),
            time_zone: TimeZone::system(),
        }
    }
}

impl SweepSchedule {
    /// The window swept by the fire on `fire_date`.
    ///
    /// # Errors
    ///
    /// Returns an error if the local times fall outside jiff's supported range.
    pub fn window_for(&self, fire_date: Date) -> Result<SweepWindow, jiff::Error> {
        let start = fire_date
            .yesterday()?
            .to_datetime(self.window_opens_at)
            .to_zoned(self.time_zone.clone())?
            .timestamp();

        Ok(SweepWindow {
            start,
            end: self.fire_instant(fire_date)?,
        })
    }

    /// The window of the latest fire at or before `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the local times fall outside jiff's supported range.
    pub fn most_recent_window(&self, now: Timestamp) -> Result<SweepWindow, jiff::Error> {
        let today = now.to_zoned(self.time_zone.clone()).date();

        let fire_date = if now >= self.fire_instant(today)? {
            today
        } else {
            today.yesterday()?
        };

        self.window_for(fire_date)
    }

    /// The first fire strictly after `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the local times fall outside jiff's supported range.
    pub fn next_fire_after(&self, now: Timestamp) -> Result<Timestamp, jiff::Error> {
        let today = now.to_zoned(self.time_zone.clone()).date();
        let fire = self.fire_instant(today)?;

        if fire > now {
            Ok(fire)
        } else {
            self.fire_instant(today.tomorrow()?)
        }
    }

    fn fire_instant(&self, date: Date) -> Result<Timestamp, jiff::Error> {
        date.to_datetime(self.fire_at)
            .to_zoned(self.time_zone.clone())
            .map(|zoned| zoned.timestamp())
    }
}

pub type SweepObserver = Box<dyn Fn(&SweepReport) + Send + Sync>;

/// Background task firing the sweep on its schedule.
pub struct SweepRunner {
    service: Arc<dyn OrdersService>,
    schedule: SweepSchedule,
    catch_up: bool,
    observer: Option<SweepObserver>,
}

impl SweepRunner {
    #[must_use]
    pub fn new(service: Arc<dyn OrdersService>, schedule: SweepSchedule) -> Self {
        Self {
            service,
            schedule,
            catch_up: true,
            observer: None,
        }
    }

    /// Sweep the most recent window once on start, covering a fire missed
    /// while the process was down.
    #[must_use]
    pub fn with_catch_up(mut self, catch_up: bool) -> Self {
        self.catch_up = catch_up;
        self
    }

    /// Called with every completed sweep's report.
    #[must_use]
    pub fn with_observer(mut self, observer: impl Fn(&SweepReport) + Send + Sync + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Sweep forever. Only returns if the schedule cannot be computed.
    pub async fn run(self) {
        info!(
            fire_at = %self.schedule.fire_at,
            window_opens_at = %self.schedule.window_opens_at,
            time_zone = self.schedule.time_zone.iana_name().unwrap_or("local"),
            catch_up = self.catch_up,
            "order sweep scheduled"
        );

        if self.catch_up {
            self.sweep_at(Timestamp::now()).await;
        }

        loop {
            let now = Timestamp::now();

            let next = match self.schedule.next_fire_after(now) {
                Ok(next) => next,
                Err(error) => {
                    error!(error = %error, "failed to compute next sweep time");

                    return;
                }
            };

            let wait = Duration::try_from(now.duration_until(next)).unwrap_or(Duration::ZERO);

            debug!(next = %next, wait_secs = wait.as_secs(), "waiting for next order sweep");

            sleep(wait).await;

            self.sweep_at(next).await;
        }
    }

    /// Sweep the most recent window as of `at`.
    pub async fn sweep_at(&self, at: Timestamp) -> Option<SweepReport> {
        let window = match self.schedule.most_recent_window(at) {
            Ok(window) => window,
            Err(error) => {
                error!(error = %error, at = %at, "failed to compute sweep window");

                return None;
            }
        };

        match self.service.promote_ready_orders(window).await {
            Ok(report) => {
                if let Some(observer) = &self.observer {
                    observer(&report);
                }

                Some(report)
            }
            Err(error) => {
                error!(error = %error, "order sweep failed");

                None
            }
        }
    }
}
