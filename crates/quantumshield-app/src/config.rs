//! Client configuration.

use std::time::Duration;

use quantumshield_core::MESSAGE_EVENT;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default channel endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000";

/// Default delay between visualizer stages.
pub const DEFAULT_STAGE_INTERVAL: Duration = Duration::from_secs(1);

/// Invalid configuration values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Endpoint address is empty.
    #[error("endpoint must not be empty")]
    EmptyEndpoint,

    /// Message event name is empty.
    #[error("message event name must not be empty")]
    EmptyMessageEvent,

    /// Stage interval is zero.
    #[error("stage interval must be positive")]
    ZeroStageInterval,

    /// Channel handle was built for another message event.
    #[error("channel uses message event {channel:?}, config names {config:?}")]
    MessageEventMismatch {
        /// Event name in the configuration.
        config: String,
        /// Event name the channel handle encodes with.
        channel: String,
    },
}

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Channel endpoint address handed to the transport.
    pub endpoint: String,
    /// Event name used for chat messages in both directions.
    pub message_event: String,
    /// Delay between visualizer stages.
    pub stage_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            message_event: MESSAGE_EVENT.to_owned(),
            stage_interval: DEFAULT_STAGE_INTERVAL,
        }
    }
}

impl ClientConfig {
    /// Override the endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Override the message event name.
    #[must_use]
    pub fn with_message_event(mut self, event: impl Into<String>) -> Self {
        self.message_event = event.into();
        self
    }

    /// Override the stage interval.
    #[must_use]
    pub fn with_stage_interval(mut self, interval: Duration) -> Self {
        self.stage_interval = interval;
        self
    }

    /// Check that every field is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::EmptyEndpoint);
        }
        if self.message_event.is_empty() {
            return Err(ConfigError::EmptyMessageEvent);
        }
        if self.stage_interval.is_zero() {
            return Err(ConfigError::ZeroStageInterval);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = ClientConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.message_event, "message");
        assert_eq!(config.stage_interval, Duration::from_secs(1));
    }

    #[test]
    fn invalid_fields_are_reported() {
        assert_eq!(
            ClientConfig::default().with_endpoint(" ").validate(),
            Err(ConfigError::EmptyEndpoint)
        );
        assert_eq!(
            ClientConfig::default().with_message_event("").validate(),
            Err(ConfigError::EmptyMessageEvent)
        );
        assert_eq!(
            ClientConfig::default().with_stage_interval(Duration::ZERO).validate(),
            Err(ConfigError::ZeroStageInterval)
        );
    }
}
