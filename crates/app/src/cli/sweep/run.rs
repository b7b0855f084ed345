use brew_orders_app::{
    context::AppContext,
    domain::orders::{SweepRunner, SweepSchedule},
};
use clap::Args;
use jiff::{Timestamp, civil::Time, tz::TimeZone};

#[derive(Debug, Args)]
pub(crate) struct RunSweepArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Sweep as if run at this instant; defaults to now
    #[arg(long)]
    at: Option<Timestamp>,

    /// Local time the nightly sweep fires
    #[arg(long, env = "SWEEP_AT", default_value = "02:00:00")]
    fire_at: Time,

    /// Local time on the previous day when the sweep window opens
    #[arg(long, env = "SWEEP_WINDOW_OPENS_AT", default_value = "14:00:00")]
    window_opens_at: Time,

    /// IANA time zone for the schedule; defaults to the system zone
    #[arg(long, env = "SWEEP_TIME_ZONE")]
    time_zone: Option<String>,
}

pub(crate) async fn run(args: RunSweepArgs) -> Result<(), String> {
    let time_zone = match args.time_zone.as_deref() {
        Some(name) => TimeZone::get(name)
            .map_err(|error| format!("unknown time zone `{name}`: {error}"))?,
        None => TimeZone::system(),
    };

    let ctx = AppContext::from_database_url(&args.database_url, false)
        .await
        .map_err(|error| format!("failed to initialise application: {error}"))?;

    let schedule = SweepSchedule {
        fire_at: args.fire_at,
        window_opens_at: args.window_opens_at,
        time_zone,
    };

    let at = args.at.unwrap_or_else(Timestamp::now);

    let report = SweepRunner::new(ctx.orders, schedule)
        .sweep_at(at)
        .await
        .ok_or_else(|| "order sweep failed".to_string())?;

    println!("window_start: {}", report.window_start);
    println!("window_end: {}", report.window_end);
    println!("promoted: {}", report.promoted);
    println!("failed: {}", report.failed);

    Ok(())
}
