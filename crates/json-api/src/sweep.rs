//! Background order sweep wiring.

use std::sync::Arc;

use brew_orders_app::domain::orders::{OrdersService, SweepRunner};
use tokio::task::JoinHandle;
use tracing::info;

use crate::{config::sweep::SweepConfig, observability};

/// Start the nightly sweep when enabled.
///
/// # Errors
///
/// Returns an error if the configured schedule cannot be built.
pub(crate) fn start(
    config: &SweepConfig,
    orders: Arc<dyn OrdersService>,
) -> Result<Option<JoinHandle<()>>, jiff::Error> {
    if !config.enabled {
        info!("order sweep disabled");

        return Ok(None);
    }

    let runner = SweepRunner::new(orders, config.schedule()?)
        .with_catch_up(config.catch_up)
        .with_observer(observability::observe_sweep);

    Ok(Some(runner.spawn()))
}
