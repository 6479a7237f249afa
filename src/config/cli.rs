use crate::config::scenario::ScenarioConfig;
use crate::core::dispatcher::{DispatcherConfig, EmptyOrderPolicy};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "kitchen-dispatch")]
#[command(about = "Route kitchen orders to on-duty staff by speciality")]
pub struct CliConfig {
    /// Path to the TOML scenario file
    #[arg(short, long, default_value = "kitchen-scenario.toml")]
    pub scenario: String,

    /// Bound every relay, overriding the scenario's dispatcher section
    #[arg(long)]
    pub relay_timeout_ms: Option<u64>,

    /// Refuse orders that request no specialities
    #[arg(long)]
    pub reject_empty_orders: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// Scenario dispatcher settings with command-line overrides applied.
    pub fn dispatcher_config(&self, scenario: &ScenarioConfig) -> DispatcherConfig {
        let mut config = scenario.dispatcher_config();
        if let Some(timeout_ms) = self.relay_timeout_ms {
            config.relay_timeout = Some(Duration::from_millis(timeout_ms));
        }
        if self.reject_empty_orders {
            config.empty_order_policy = EmptyOrderPolicy::Reject;
        }
        config
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("scenario", &self.scenario)?;
        if let Some(timeout_ms) = self.relay_timeout_ms {
            validation::validate_range("relay_timeout_ms", timeout_ms, 1, 600_000)?;
        }
        Ok(())
    }
}
