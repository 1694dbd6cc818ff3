//! Scheduler configuration.
//!
//! Constructed once by the caller and passed into the scheduler by value;
//! there is no module-level mutable state anywhere in this crate.

use crate::error::CoreError;
use crate::message::MAX_PRIORITY;

/// Immutable configuration for one scheduler instance.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Maximum number of rounds before a run is force-terminated as a
    /// timeout failure. Doubles as the circuit breaker for cyclic plans.
    pub max_steps: u32,
    /// Priority assigned to COMMAND messages dispatched for ready nodes.
    pub command_priority: u8,
    /// Priority assigned to agent-to-agent NOTIFICATION messages.
    pub notification_priority: u8,
    /// Priority used when a message is composed without an explicit one.
    pub default_priority: u8,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_steps: 15,
            command_priority: 5,
            notification_priority: 3,
            default_priority: 5,
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.max_steps == 0 {
            return Err(CoreError::Configuration(
                "max_steps must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("command_priority", self.command_priority),
            ("notification_priority", self.notification_priority),
            ("default_priority", self.default_priority),
        ] {
            if value > MAX_PRIORITY {
                return Err(CoreError::Configuration(format!(
                    "{} must be in 0..={}, got {}",
                    name, MAX_PRIORITY, value
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SchedulerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_steps, 15);
    }

    #[test]
    fn test_rejects_zero_steps_and_out_of_range_priority() {
        let mut config = SchedulerConfig {
            max_steps: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.max_steps = 10;
        config.command_priority = 11;
        assert!(config.validate().is_err());
    }
}
