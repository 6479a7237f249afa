use crate::core::dispatcher::{DispatcherConfig, EmptyOrderPolicy};
use crate::domain::model::{Payload, Specialities};
use crate::utils::error::{DispatchError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_RESULT_PREFIX: &str = "cooked";
const MAX_RELAY_TIMEOUT_MS: u64 = 600_000;

/// A kitchen shift described in TOML: who comes on duty, who leaves, and the
/// orders placed afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub kitchen: KitchenInfo,
    pub dispatcher: Option<DispatcherSection>,
    #[serde(default)]
    pub staff: Vec<StaffConfig>,
    /// Applied once every listed staff member is on duty.
    #[serde(default)]
    pub offduty: Vec<OffDutyConfig>,
    #[serde(default)]
    pub orders: Vec<OrderConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KitchenInfo {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatcherSection {
    pub relay_timeout_ms: Option<u64>,
    pub empty_order_policy: Option<EmptyOrderPolicy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffConfig {
    pub id: String,
    pub speciality: Specialities,
    /// Prepended to every order body this worker answers.
    pub result_prefix: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OffDutyConfig {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderConfig {
    pub speciality: Specialities,
    pub payload: Payload,
}

impl StaffConfig {
    pub fn result_prefix(&self) -> &str {
        self.result_prefix.as_deref().unwrap_or(DEFAULT_RESULT_PREFIX)
    }
}

impl ScenarioConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DispatchError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        let config: Self =
            toml::from_str(&processed_content).map_err(|e| DispatchError::ConfigError {
                message: format!("TOML parsing error: {}", e),
            })?;
        validation::validate_required_field("kitchen.name", &config.kitchen.name)?;
        Ok(config)
    }

    pub fn kitchen_name(&self) -> &str {
        self.kitchen.name.as_deref().unwrap_or_default()
    }

    /// Replaces `${VAR}` with the variable's value; unset variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DispatchError::ConfigError {
            message: format!("env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("kitchen.name", self.kitchen_name())?;

        for staff in &self.staff {
            validation::validate_non_empty_string("staff.id", &staff.id)?;
        }
        for offduty in &self.offduty {
            validation::validate_non_empty_string("offduty.id", &offduty.id)?;
        }

        let duplicates = validation::find_duplicates(self.staff.iter().map(|s| s.id.as_str()));
        if !duplicates.is_empty() {
            tracing::warn!(
                "Staff ids listed more than once, the last entry wins: {}",
                duplicates.join(", ")
            );
        }

        if let Some(section) = &self.dispatcher {
            if let Some(timeout_ms) = section.relay_timeout_ms {
                validation::validate_range(
                    "dispatcher.relay_timeout_ms",
                    timeout_ms,
                    1,
                    MAX_RELAY_TIMEOUT_MS,
                )?;
            }
        }

        Ok(())
    }

    pub fn dispatcher_config(&self) -> DispatcherConfig {
        let section = self.dispatcher.clone().unwrap_or_default();
        DispatcherConfig {
            relay_timeout: section.relay_timeout_ms.map(Duration::from_millis),
            empty_order_policy: section.empty_order_policy.unwrap_or_default(),
        }
    }
}

impl Validate for ScenarioConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
