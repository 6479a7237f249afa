use crate::domain::model::Specialities;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("No suitable staff found for specialities {requested}")]
    NoSuitableStaffFound { requested: Specialities },

    #[error("Channel failure: {message}")]
    ChannelFailure { message: String },

    #[error("Relay with staff '{staff_id}' timed out after {timeout:?}")]
    RelayTimeout { staff_id: String, timeout: Duration },

    #[error("Invalid request scope field '{field}': {reason}")]
    InvalidScope { field: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Routing,
    Channel,
    Input,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DispatchError {
    pub fn channel(message: impl Into<String>) -> Self {
        Self::ChannelFailure {
            message: message.into(),
        }
    }

    pub fn invalid_scope(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidScope {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NoSuitableStaffFound { .. } => ErrorCategory::Routing,
            Self::ChannelFailure { .. } | Self::RelayTimeout { .. } => ErrorCategory::Channel,
            Self::InvalidScope { .. } | Self::SerializationError(_) => ErrorCategory::Input,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Routing => ErrorSeverity::Low,
            ErrorCategory::Channel => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Whether the caller can reasonably answer the requester and carry on.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Routing | ErrorCategory::Channel | ErrorCategory::Input
        )
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::NoSuitableStaffFound { .. } => {
                "Put staff with the requested specialities on duty, or answer the order as unavailable"
            }
            Self::ChannelFailure { .. } => {
                "The requester or staff channel closed mid-relay; resubmit the order on a fresh channel"
            }
            Self::RelayTimeout { .. } => {
                "The selected staff did not answer in time; check the worker or raise the relay timeout"
            }
            Self::InvalidScope { .. } => {
                "Check the request scope carries a string 'type', an 'id' for duty events and a string or list 'speciality'"
            }
            Self::IoError(_) => "Check that the file exists and is readable",
            Self::SerializationError(_) => "Check the payload is valid JSON",
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => "Fix the scenario file and run again",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::NoSuitableStaffFound { requested } => {
                format!("Nobody on duty can prepare an order for {}", requested)
            }
            Self::RelayTimeout { staff_id, .. } => {
                format!("Staff '{}' took too long to answer", staff_id)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DispatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_suitable_staff_is_recoverable_routing_error() {
        let err = DispatchError::NoSuitableStaffFound {
            requested: Specialities::from(vec!["grill", "bake"]),
        };
        assert_eq!(err.category(), ErrorCategory::Routing);
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("grill"));
        assert!(err.user_friendly_message().contains("bake"));
    }

    #[test]
    fn test_channel_errors_are_medium() {
        let err = DispatchError::channel("peer hung up");
        assert_eq!(err.category(), ErrorCategory::Channel);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err.to_string().contains("peer hung up"));

        let timeout = DispatchError::RelayTimeout {
            staff_id: "w1".to_string(),
            timeout: Duration::from_millis(50),
        };
        assert_eq!(timeout.severity(), ErrorSeverity::Medium);
        assert!(timeout.user_friendly_message().contains("w1"));
    }

    #[test]
    fn test_config_and_io_errors_are_not_recoverable() {
        let config = DispatchError::MissingConfigError {
            field: "staff.id".to_string(),
        };
        assert_eq!(config.severity(), ErrorSeverity::High);
        assert!(!config.is_recoverable());

        let io: DispatchError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "scenario.toml").into();
        assert_eq!(io.severity(), ErrorSeverity::Critical);
        assert!(io.to_string().contains("IO error"));
    }
}
