//! Server configuration module

use clap::Parser;

use crate::config::{
    db::DatabaseConfig,
    observability::{LoggingConfig, ObservabilityConfig},
    server::ServerRuntimeConfig,
    sweep::SweepConfig,
};

pub(crate) mod db;
pub(crate) mod observability;
pub(crate) mod server;
pub(crate) mod sweep;

/// Brew Orders JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "brew-orders-json", about = "Brew Orders JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Request observability settings.
    #[command(flatten)]
    pub observability: ObservabilityConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Nightly order sweep settings.
    #[command(flatten)]
    pub sweep: SweepConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn defaults_apply_when_only_the_database_is_given() -> TestResult {
        let config = ServerConfig::try_parse_from([
            "brew-orders-json",
            "--database-url",
            "postgres://localhost/brew_orders",
        ])?;

        assert_eq!(config.socket_addr(), "0.0.0.0:8698", "default bind address");
        assert!(!config.database.run_migrations, "migrations are opt-in");
        assert!(config.sweep.enabled, "sweep runs by default");
        assert!(config.sweep.catch_up, "catch-up runs by default");
        assert_eq!(config.sweep.fire_at.to_string(), "02:00:00", "default fire time");
        assert_eq!(
            config.sweep.window_opens_at.to_string(),
            "14:00:00",
            "default window opening"
        );

        Ok(())
    }

    #[test]
    fn sweep_can_be_disabled() -> TestResult {
        let config = ServerConfig::try_parse_from([
            "brew-orders-json",
            "--database-url",
            "postgres://localhost/brew_orders",
            "--sweep-enabled",
            "false",
        ])?;

        assert!(!config.sweep.enabled, "sweep should be disabled");

        Ok(())
    }
}
